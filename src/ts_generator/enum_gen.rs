use super::{doc_comment, object_key, FormatOptions, INDENT};
use crate::transform::{EnumGroup, EnumGroupValue, GroupKind, TransformedEnum};

/// Enum module generator: the const object, its union type and group exports
pub struct EnumGenerator {
    options: FormatOptions,
}

impl EnumGenerator {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    pub fn generate(&self, record: &TransformedEnum) -> String {
        let mut lines = Vec::new();
        let as_const = if self.options.is_ts() { " as const" } else { "" };

        if let Some(doc) = &record.doc {
            lines.extend(doc_comment(doc, ""));
        }

        if record.cases.is_empty() {
            lines.push(format!("export const {} = {{}}{};", record.name, as_const));
        } else {
            lines.push(format!("export const {} = {{", record.name));
            let len = record.cases.len();
            for (i, case) in record.cases.iter().enumerate() {
                if let Some(doc) = &case.doc {
                    lines.extend(doc_comment(doc, INDENT));
                }
                lines.push(format!(
                    "{}{}: {}{}",
                    INDENT,
                    object_key(&case.name),
                    case.value,
                    self.options.separator(i, len)
                ));
            }
            lines.push(format!("}}{};", as_const));
        }

        if self.options.is_ts() {
            lines.push(String::new());
            lines.push(format!(
                "export type {name} = typeof {name}[keyof typeof {name}];",
                name = record.name
            ));
        }

        for group in &record.groups {
            lines.push(String::new());
            lines.extend(self.generate_group(&record.name, group, as_const));
        }

        lines.join("\n")
    }

    fn generate_group(&self, enum_name: &str, group: &EnumGroup, as_const: &str) -> Vec<String> {
        let (open, close) = match group.kind {
            GroupKind::Array => ('[', ']'),
            GroupKind::Record => ('{', '}'),
        };

        if group.entries.is_empty() {
            return vec![format!(
                "export const {} = {}{}{};",
                group.name, open, close, as_const
            )];
        }

        let mut lines = vec![format!("export const {} = {}", group.name, open)];
        let len = group.entries.len();
        for (i, (key, value)) in group.entries.iter().enumerate() {
            let rendered = match value {
                EnumGroupValue::Enum(case) => format!("{}.{}", enum_name, case),
                EnumGroupValue::Literal(scalar) => scalar.to_string(),
            };
            let separator = self.options.separator(i, len);
            match group.kind {
                GroupKind::Array => lines.push(format!("{}{}{}", INDENT, rendered, separator)),
                GroupKind::Record => lines.push(format!(
                    "{}{}: {}{}",
                    INDENT,
                    object_key(key),
                    rendered,
                    separator
                )),
            }
        }
        lines.push(format!("{}{};", close, as_const));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::transform::{EnumCase, Scalar};
    use std::path::PathBuf;

    fn status() -> TransformedEnum {
        TransformedEnum {
            name: "Status".into(),
            qualified_name: "App\\Enums\\Status".into(),
            namespace: Some("App\\Enums".into()),
            doc: None,
            cases: vec![
                EnumCase {
                    name: "ACTIVE".into(),
                    value: Scalar::Str("active".into()),
                    doc: Some("Active account".into()),
                },
                EnumCase {
                    name: "INACTIVE".into(),
                    value: Scalar::Str("inactive".into()),
                    doc: None,
                },
            ],
            groups: Vec::new(),
            output_path: PathBuf::from("Status.ts"),
        }
    }

    fn options(format: OutputFormat, trailing_comma: bool) -> FormatOptions {
        FormatOptions {
            format,
            trailing_comma,
        }
    }

    #[test]
    fn test_ts_enum() {
        let out = EnumGenerator::new(options(OutputFormat::Ts, true)).generate(&status());
        assert_eq!(
            out,
            "export const Status = {\n  /** Active account */\n  ACTIVE: 'active',\n  INACTIVE: 'inactive',\n} as const;\n\nexport type Status = typeof Status[keyof typeof Status];"
        );
    }

    #[test]
    fn test_js_enum_without_trailing_comma() {
        let out = EnumGenerator::new(options(OutputFormat::Js, false)).generate(&status());
        assert_eq!(
            out,
            "export const Status = {\n  /** Active account */\n  ACTIVE: 'active',\n  INACTIVE: 'inactive'\n};"
        );
    }

    #[test]
    fn test_groups() {
        let mut record = status();
        record.groups = vec![
            EnumGroup {
                name: "Options".into(),
                kind: GroupKind::Array,
                entries: vec![
                    ("0".into(), EnumGroupValue::Enum("ACTIVE".into())),
                    ("1".into(), EnumGroupValue::Literal(Scalar::Null)),
                ],
            },
            EnumGroup {
                name: "Labels".into(),
                kind: GroupKind::Record,
                entries: vec![("on".into(), EnumGroupValue::Literal(Scalar::Str("On".into())))],
            },
            EnumGroup {
                name: "Nothing".into(),
                kind: GroupKind::Array,
                entries: vec![],
            },
        ];
        let out = EnumGenerator::new(options(OutputFormat::Ts, true)).generate(&record);
        assert!(out.contains(
            "export type Status = typeof Status[keyof typeof Status];\n\nexport const Options = [\n  Status.ACTIVE,\n  null,\n] as const;"
        ));
        assert!(out.contains("export const Labels = {\n  on: 'On',\n} as const;"));
        assert!(out.ends_with("export const Nothing = [] as const;"));
    }

    #[test]
    fn test_int_enum() {
        let record = TransformedEnum {
            name: "Priority".into(),
            qualified_name: "Priority".into(),
            namespace: None,
            doc: Some("Task priority".into()),
            cases: vec![EnumCase {
                name: "LOW".into(),
                value: Scalar::Int(1),
                doc: None,
            }],
            groups: Vec::new(),
            output_path: PathBuf::from("Priority.js"),
        };
        let out = EnumGenerator::new(options(OutputFormat::Js, true)).generate(&record);
        assert_eq!(out, "/** Task priority */\nexport const Priority = {\n  LOW: 1,\n};");
    }
}
