use super::{quote, FormatOptions, INDENT};
use crate::error::{Error, Result};
use crate::transform::TransformedEnumTranslator;

/// i18n runtime the translator helpers bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    I18next,
    VueI18n,
    ReactI18next,
}

impl Runtime {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "i18next" => Ok(Runtime::I18next),
            "vue-i18n" | "vue" => Ok(Runtime::VueI18n),
            "react-i18next" | "react" => Ok(Runtime::ReactI18next),
            _ => Err(Error::UnsupportedRuntime(name.to_string())),
        }
    }

    fn import_line(self) -> &'static str {
        match self {
            Runtime::I18next => "import i18n from 'i18next';",
            Runtime::VueI18n => "import { useI18n } from 'vue-i18n';",
            Runtime::ReactI18next => "import { useTranslation } from 'react-i18next';",
        }
    }

    /// Statement binding `t` inside the helper
    fn bind_t(self) -> &'static str {
        match self {
            Runtime::I18next => "const t = i18n.t.bind(i18n);",
            Runtime::VueI18n => "const { t } = useI18n();",
            Runtime::ReactI18next => "const { t } = useTranslation();",
        }
    }
}

pub struct TranslatorGenerator<'a> {
    options: FormatOptions,
    runtime: &'a str,
    helper_import: &'a str,
}

impl<'a> TranslatorGenerator<'a> {
    pub fn new(options: FormatOptions, runtime: &'a str, helper_import: &'a str) -> Self {
        Self {
            options,
            runtime,
            helper_import,
        }
    }

    pub fn generate(&self, record: &TransformedEnumTranslator) -> Result<String> {
        let runtime = Runtime::parse(self.runtime)?;
        let enum_name = &record.enum_name;
        let cast = if self.options.is_ts() {
            format!(" as Record<{}, string>", enum_name)
        } else {
            String::new()
        };
        let trailing = if self.options.trailing_comma { "," } else { "" };

        let lines = vec![
            runtime.import_line().to_string(),
            format!("import {{ useTranslator }} from {};", quote(self.helper_import)),
            format!("import {{ {} }} from {};", enum_name, quote(&record.enum_import_path)),
            String::new(),
            format!("export function {}() {{", record.name),
            format!("{}{}", INDENT, runtime.bind_t()),
            format!("{}const keys = Object.fromEntries(", INDENT),
            format!(
                "{}{}Object.values({}).map((value) => [value, `{}.${{value}}`]){}",
                INDENT,
                INDENT,
                enum_name,
                template_literal_text(&record.translation_key),
                trailing
            ),
            format!("{}){};", INDENT, cast),
            String::new(),
            format!("{}return useTranslator(keys, t);", INDENT),
            "}".to_string(),
        ];

        Ok(lines.join("\n"))
    }
}

/// Escape text for use inside a template literal.
fn template_literal_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}
