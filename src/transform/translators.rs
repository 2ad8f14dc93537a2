use super::{OutputTarget, TransformedEnumTranslator};
use crate::php::EnumDeclaration;
use crate::registry::TRANSLATOR_MARKER;
use crate::ts_generator::ImportResolver;

/// Builds translator helper records for enums carrying the translator marker.
pub struct TranslatorTransformer<'a> {
    enum_target: &'a OutputTarget,
    target: &'a OutputTarget,
    import_resolver: &'a ImportResolver,
}

impl<'a> TranslatorTransformer<'a> {
    pub fn new(
        enum_target: &'a OutputTarget,
        target: &'a OutputTarget,
        import_resolver: &'a ImportResolver,
    ) -> Self {
        Self {
            enum_target,
            target,
            import_resolver,
        }
    }

    /// None when the enum has no marker or opts out of helper generation.
    pub fn transform(&self, decl: &EnumDeclaration) -> Option<TransformedEnumTranslator> {
        let marker = decl.attribute(TRANSLATOR_MARKER)?;
        if !marker.bool_arg("generateComposable", 1, true) {
            return None;
        }

        let translation_key = marker
            .string_arg("translationKey", 0)
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| decl.name.clone());
        let name = helper_name(&decl.name);
        let output_path = self.target.path_for(&name);
        let enum_path = self.enum_target.path_for(&decl.name);

        Some(TransformedEnumTranslator {
            enum_import_path: self.import_resolver.resolve(&output_path, &enum_path),
            name,
            enum_name: decl.name.clone(),
            translation_key,
            output_path,
        })
    }
}

pub fn helper_name(enum_name: &str) -> String {
    format!("use{}Translator", enum_name)
}
