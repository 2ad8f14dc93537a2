use super::{EnumCase, EnumGroup, EnumGroupValue, GroupKind, OutputTarget, Scalar, TransformedEnum};
use crate::error::{Error, Result};
use crate::php::lexer::TokenKind;
use crate::php::{BackingType, CaseLookup, EnumDeclaration, EvalContext, Evaluator, MethodDecl, PhpValue};
use crate::registry::GENERATE_MARKER;
use tracing::debug;

/// Turns enum declarations into [`TransformedEnum`] records.
pub struct EnumTransformer<'a> {
    cases: &'a dyn CaseLookup,
    target: &'a OutputTarget,
}

impl<'a> EnumTransformer<'a> {
    pub fn new(cases: &'a dyn CaseLookup, target: &'a OutputTarget) -> Self {
        Self { cases, target }
    }

    pub fn transform(&self, decl: &EnumDeclaration) -> Result<TransformedEnum> {
        let marker = decl.attribute(GENERATE_MARKER);
        let requires_comments = marker
            .map(|m| m.bool_arg("requiresComments", 0, false))
            .unwrap_or(false);
        let include_methods = marker
            .map(|m| m.string_list_arg("includeMethods", 1))
            .unwrap_or_default();

        let cases = self.transform_cases(decl, requires_comments)?;

        let mut groups: Vec<(String, EnumGroup)> = Vec::new();
        for method in &include_methods {
            let group = self.transform_group(decl, method)?;

            if group.name == decl.name {
                return Err(Error::DuplicateGroupName {
                    enum_name: decl.name.clone(),
                    group: group.name,
                    conflict: "the enum itself".to_string(),
                });
            }
            if let Some((previous, _)) = groups.iter().find(|(_, g)| g.name == group.name) {
                return Err(Error::DuplicateGroupName {
                    enum_name: decl.name.clone(),
                    group: group.name,
                    conflict: format!("the group built from method '{}'", previous),
                });
            }
            groups.push((method.clone(), group));
        }

        debug!(
            "Transformed enum {} ({} cases, {} groups)",
            decl.qualified_name,
            cases.len(),
            groups.len()
        );

        Ok(TransformedEnum {
            name: decl.name.clone(),
            qualified_name: decl.qualified_name.clone(),
            namespace: decl.namespace.clone(),
            doc: decl.doc.clone(),
            cases,
            groups: groups.into_iter().map(|(_, g)| g).collect(),
            output_path: self.target.path_for(&decl.name),
        })
    }

    fn transform_cases(&self, decl: &EnumDeclaration, requires_comments: bool) -> Result<Vec<EnumCase>> {
        let Some(backing) = decl.backing else {
            return Err(Error::UnsupportedCaseValue {
                enum_name: decl.name.clone(),
                case: decl.cases.first().map(|c| c.name.clone()).unwrap_or_default(),
                reason: "only backed enums can be generated".to_string(),
            });
        };

        let mut cases = Vec::with_capacity(decl.cases.len());
        for case in &decl.cases {
            let unsupported = |reason: String| Error::UnsupportedCaseValue {
                enum_name: decl.name.clone(),
                case: case.name.clone(),
                reason,
            };

            let value = match (&case.value, backing) {
                (Some(Ok(PhpValue::Str(s))), BackingType::String) => Scalar::Str(s.clone()),
                (Some(Ok(PhpValue::Int(n))), BackingType::Int) => Scalar::Int(*n),
                (Some(Ok(other)), _) => {
                    return Err(unsupported(format!(
                        "{} does not match the backing type",
                        other.kind_name()
                    )))
                }
                (Some(Err(e)), _) => return Err(unsupported(e.to_string())),
                (None, _) => return Err(unsupported("case has no value".to_string())),
            };

            if requires_comments && case.doc.is_none() {
                return Err(Error::MissingCaseComment {
                    enum_name: decl.name.clone(),
                    case: case.name.clone(),
                });
            }

            cases.push(EnumCase {
                name: case.name.clone(),
                value,
                doc: case.doc.clone(),
            });
        }
        Ok(cases)
    }

    fn transform_group(&self, decl: &EnumDeclaration, method_name: &str) -> Result<EnumGroup> {
        let method = decl.method(method_name).ok_or_else(|| Error::GroupMethodMissing {
            enum_name: decl.name.clone(),
            method: method_name.to_string(),
        })?;

        if method.params != 0 {
            return Err(Error::GroupMethodSignature {
                enum_name: decl.name.clone(),
                method: method.name.clone(),
                params: method.params,
            });
        }
        if !method.is_public || !method.is_static {
            return Err(Error::GroupMethodBinding {
                enum_name: decl.name.clone(),
                method: method.name.clone(),
                line: method.line,
            });
        }

        let entries = match self.evaluate_return(decl, method)? {
            PhpValue::Array(entries) => entries,
            other => {
                return Err(Error::GroupReturnShape {
                    enum_name: decl.name.clone(),
                    method: method.name.clone(),
                    reason: format!("returns {}", other.kind_name()),
                })
            }
        };

        let kind = if PhpValue::is_list(&entries) {
            GroupKind::Array
        } else {
            GroupKind::Record
        };

        let mut values = Vec::with_capacity(entries.len());
        for (key, value) in &entries {
            let key = key.to_string();
            let value = self.group_value(decl, method, &key, value)?;
            values.push((key, value));
        }

        Ok(EnumGroup {
            name: group_name(&method.name),
            kind,
            entries: values,
        })
    }

    /// Evaluate a body of the form `return <expression>;`.
    fn evaluate_return(&self, decl: &EnumDeclaration, method: &MethodDecl) -> Result<PhpValue> {
        let shape_error = |reason: String| Error::GroupReturnShape {
            enum_name: decl.name.clone(),
            method: method.name.clone(),
            reason,
        };

        let body = method.body.as_deref().unwrap_or_default();
        match body.first() {
            Some(t) if t.is_ident("return") => {}
            _ => return Err(shape_error("body must be a single return statement".to_string())),
        }

        let ctx = EvalContext {
            scope: &decl.scope,
            current_class: Some(&decl.qualified_name),
            cases: self.cases,
        };
        let mut evaluator = Evaluator::new(&body[1..], &ctx);
        let value = evaluator.expression().map_err(|e| shape_error(e.to_string()))?;

        let rest = &body[1 + evaluator.pos()..];
        let only_semicolon = matches!(rest, [t] if t.kind == TokenKind::Semicolon);
        if !only_semicolon {
            return Err(shape_error("body must be a single return statement".to_string()));
        }
        Ok(value)
    }

    fn group_value(
        &self,
        decl: &EnumDeclaration,
        method: &MethodDecl,
        key: &str,
        value: &PhpValue,
    ) -> Result<EnumGroupValue> {
        let invalid = |reason: String| Error::GroupValue {
            enum_name: decl.name.clone(),
            method: method.name.clone(),
            key: key.to_string(),
            reason,
        };

        match value {
            PhpValue::Null => Ok(EnumGroupValue::Literal(Scalar::Null)),
            PhpValue::Bool(b) => Ok(EnumGroupValue::Literal(Scalar::Bool(*b))),
            PhpValue::Int(n) => Ok(EnumGroupValue::Literal(Scalar::Int(*n))),
            PhpValue::Float(f) => Ok(EnumGroupValue::Literal(Scalar::Float(*f))),
            PhpValue::Str(s) => Ok(EnumGroupValue::Literal(Scalar::Str(s.clone()))),
            PhpValue::CaseRef { class, case } => {
                if !class.eq_ignore_ascii_case(&decl.qualified_name) {
                    return Err(invalid(format!(
                        "'{}::{}' belongs to another enum",
                        class, case
                    )));
                }
                if decl.case(case).is_none() {
                    return Err(invalid(format!("'{}' is not a case of {}", case, decl.name)));
                }
                Ok(EnumGroupValue::Enum(case.clone()))
            }
            PhpValue::Array(_) => Err(invalid("nested arrays are not supported".to_string())),
        }
    }
}

/// Group export name: the method name with its first character uppercased.
fn group_name(method: &str) -> String {
    let mut chars = method.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::php::parse_source;
    use crate::registry::EnumRegistry;
    use std::path::PathBuf;

    fn target() -> OutputTarget {
        OutputTarget {
            dir: PathBuf::from("out"),
            file_name: "{name}.{ext}".into(),
            format: OutputFormat::Ts,
        }
    }

    fn transform(src: &str) -> Result<TransformedEnum> {
        let mut registry = EnumRegistry::new();
        for decl in parse_source(src).enums {
            registry.register(decl);
        }
        let decl = registry.all().last().cloned().unwrap();
        let target = target();
        EnumTransformer::new(&registry, &target).transform(&decl)
    }

    #[test]
    fn test_cases_and_docs() {
        let result = transform(
            r#"<?php namespace App\Enums;
            #[GenerateTs(requiresComments: true)]
            enum Status: string {
                /** Active */
                case ACTIVE = 'active';
                /** Pending */
                case PENDING = 'pending';
            }"#,
        )
        .unwrap();
        assert_eq!(result.name, "Status");
        assert_eq!(result.output_path, PathBuf::from("out/Status.ts"));
        assert_eq!(result.cases.len(), 2);
        assert_eq!(result.cases[1].value, Scalar::Str("pending".into()));
        assert_eq!(result.cases[0].doc.as_deref(), Some("Active"));
    }

    #[test]
    fn test_missing_comment_is_fatal() {
        let err = transform(
            r#"<?php #[GenerateTs(requiresComments: true)]
            enum Status: string { /** A */ case A = 'a'; case B = 'b'; }"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingCaseComment { ref case, .. } if case == "B"));
    }

    #[test]
    fn test_groups() {
        let result = transform(
            r#"<?php namespace App\Enums;
            #[GenerateTs(includeMethods: ['options', 'labels'])]
            enum Status: string {
                case ACTIVE = 'active';
                case INACTIVE = 'inactive';

                public static function options(): array {
                    return [self::ACTIVE, Status::INACTIVE, null];
                }

                public static function labels(): array {
                    return ['on' => self::ACTIVE, self::INACTIVE->value => 'Off'];
                }
            }"#,
        )
        .unwrap();

        assert_eq!(result.groups.len(), 2);
        let options = &result.groups[0];
        assert_eq!(options.name, "Options");
        assert_eq!(options.kind, GroupKind::Array);
        assert_eq!(
            options.entries,
            vec![
                ("0".to_string(), EnumGroupValue::Enum("ACTIVE".into())),
                ("1".to_string(), EnumGroupValue::Enum("INACTIVE".into())),
                ("2".to_string(), EnumGroupValue::Literal(Scalar::Null)),
            ]
        );

        let labels = &result.groups[1];
        assert_eq!(labels.kind, GroupKind::Record);
        assert_eq!(labels.entries[1].0, "inactive");
        assert_eq!(labels.entries[1].1, EnumGroupValue::Literal(Scalar::Str("Off".into())));
    }

    #[test]
    fn test_group_method_errors_are_distinct() {
        let with = |method: &str, name: &str| {
            transform(&format!(
                r#"<?php #[GenerateTs(includeMethods: ['{}'])]
                enum Status: string {{ case A = 'a'; {} }}"#,
                name, method
            ))
            .unwrap_err()
        };

        assert!(matches!(with("", "nope"), Error::GroupMethodMissing { .. }));
        assert!(matches!(
            with("public static function opts($x): array { return []; }", "opts"),
            Error::GroupMethodSignature { params: 1, .. }
        ));
        assert!(matches!(
            with("public function opts(): array { return []; }", "opts"),
            Error::GroupMethodBinding { .. }
        ));
        assert!(matches!(
            with("private static function opts(): array { return []; }", "opts"),
            Error::GroupMethodBinding { .. }
        ));
        assert!(matches!(
            with("public static function opts(): string { return 'x'; }", "opts"),
            Error::GroupReturnShape { .. }
        ));
        assert!(matches!(
            with("public static function opts(): array { $x = 1; return []; }", "opts"),
            Error::GroupReturnShape { .. }
        ));
        assert!(matches!(
            with("public static function opts(): array { return [[1]]; }", "opts"),
            Error::GroupValue { .. }
        ));
        assert!(matches!(
            with("public static function opts(): array { return [Other::A]; }", "opts"),
            Error::GroupValue { .. }
        ));
    }

    #[test]
    fn test_group_name_collisions() {
        let err = transform(
            r#"<?php #[GenerateTs(includeMethods: ['status'])]
            enum Status: string { case A = 'a';
                public static function status(): array { return []; } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateGroupName { .. }));

        let err = transform(
            r#"<?php #[GenerateTs(includeMethods: ['options', 'OPTIONS'])]
            enum Status: string { case A = 'a';
                public static function options(): array { return []; } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateGroupName { ref group, .. } if group == "Options"));
    }

    #[test]
    fn test_group_names_keep_method_casing() {
        let result = transform(
            r#"<?php #[GenerateTs(includeMethods: ['HTTPCodes', 'all_items', 'allItems'])]
            enum Status: string { case A = 'a';
                public static function HTTPCodes(): array { return []; }
                public static function all_items(): array { return []; }
                public static function allItems(): array { return []; } }"#,
        )
        .unwrap();
        let names: Vec<_> = result.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["HTTPCodes", "All_items", "AllItems"]);
    }

    #[test]
    fn test_private_const_before_implicit_public_method() {
        let result = transform(
            r#"<?php #[GenerateTs(includeMethods: ['options'])]
            enum S: string { case A = 'a'; private const X = 'x';
                static function options(): array { return [self::A]; } }"#,
        )
        .unwrap();
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].name, "Options");
        assert_eq!(
            result.groups[0].entries,
            vec![("0".to_string(), EnumGroupValue::Enum("A".into()))]
        );
    }

    #[test]
    fn test_binding_error_names_the_line() {
        let err = transform(
            "<?php #[GenerateTs(includeMethods: ['opts'])]\nenum S: string { case A = 'a';\n    private static function opts(): array { return []; } }",
        )
        .unwrap_err();
        assert!(matches!(err, Error::GroupMethodBinding { line: 3, .. }));
        assert_eq!(err.to_string(), "Method 'S::opts' (line 3) must be public and static");
    }

    #[test]
    fn test_backing_type_mismatch() {
        let err = transform("<?php #[GenerateTs] enum N: int { case A = 'a'; }").unwrap_err();
        assert!(matches!(err, Error::UnsupportedCaseValue { .. }));
        let err = transform("<?php #[GenerateTs] enum P { case A; }").unwrap_err();
        assert!(matches!(err, Error::UnsupportedCaseValue { .. }));
    }
}
