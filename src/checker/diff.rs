use super::ts_reader::{JsValue, ParsedExport};
use crate::transform::{EnumGroup, EnumGroupValue, GroupKind, Scalar, TransformedEnum};
use crate::ts_generator::format_float;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// Present in the fresh record
    Added(String),
    /// Present in the previously generated file
    Removed(String),
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffLine::Added(line) => write!(f, "+ {}", line),
            DiffLine::Removed(line) => write!(f, "- {}", line),
        }
    }
}

pub fn scalar_value(scalar: &Scalar) -> JsValue {
    match scalar {
        Scalar::Null => JsValue::Null,
        Scalar::Bool(b) => JsValue::Bool(*b),
        Scalar::Int(n) => JsValue::Num(n.to_string()),
        Scalar::Float(f) => JsValue::Num(format_float(*f)),
        Scalar::Str(s) => JsValue::Str(s.clone()),
    }
}

fn group_entries(enum_name: &str, group: &EnumGroup) -> Vec<(String, JsValue)> {
    group
        .entries
        .iter()
        .map(|(key, value)| {
            let value = match value {
                EnumGroupValue::Enum(case) => JsValue::Ref(format!("{}.{}", enum_name, case)),
                EnumGroupValue::Literal(scalar) => scalar_value(scalar),
            };
            (key.clone(), value)
        })
        .collect()
}

fn entry_label(group: Option<(&str, GroupKind)>, key: &str) -> String {
    match group {
        None => key.to_string(),
        Some((name, GroupKind::Array)) => format!("{}[{}]", name, key),
        Some((name, GroupKind::Record)) => format!("{}.{}", name, key),
    }
}

/// Keyed add/remove diff. A changed value yields the added line then the removed line.
fn diff_entries(
    fresh: &[(String, JsValue)],
    fresh_group: Option<(&str, GroupKind)>,
    stale: &[(String, JsValue)],
    stale_group: Option<(&str, GroupKind)>,
    out: &mut Vec<DiffLine>,
) {
    for (key, value) in fresh {
        match stale.iter().find(|(k, _)| k == key) {
            None => out.push(DiffLine::Added(format!("{}: {}", entry_label(fresh_group, key), value))),
            Some((_, old)) if old != value => {
                out.push(DiffLine::Added(format!("{}: {}", entry_label(fresh_group, key), value)));
                out.push(DiffLine::Removed(format!("{}: {}", entry_label(stale_group, key), old)));
            }
            Some(_) => {}
        }
    }
    for (key, old) in stale {
        if !fresh.iter().any(|(k, _)| k == key) {
            out.push(DiffLine::Removed(format!("{}: {}", entry_label(stale_group, key), old)));
        }
    }
}

/// Diff a fresh enum record against the exports recovered from its previous file.
///
/// `previous` holds the parsed enum object first, followed by group exports.
/// `None` means there is nothing to compare against.
pub fn diff_enum(record: &TransformedEnum, previous: Option<&[ParsedExport]>) -> Vec<DiffLine> {
    let mut lines = Vec::new();
    let empty: &[ParsedExport] = &[];
    let (stale_cases, stale_groups) = match previous {
        Some([first, rest @ ..]) => (first.entries.as_slice(), rest),
        _ => (&[][..], empty),
    };

    let fresh_cases: Vec<(String, JsValue)> = record
        .cases
        .iter()
        .map(|c| (c.name.clone(), scalar_value(&c.value)))
        .collect();
    diff_entries(&fresh_cases, None, stale_cases, None, &mut lines);

    for group in &record.groups {
        let fresh = group_entries(&record.name, group);
        let fresh_side = Some((group.name.as_str(), group.kind));
        match stale_groups.iter().find(|g| g.name == group.name) {
            None => diff_entries(&fresh, fresh_side, &[], None, &mut lines),
            Some(old) => {
                if old.kind != group.kind {
                    lines.push(DiffLine::Added(format!("{}[@kind]: {}", group.name, group.kind.as_str())));
                    lines.push(DiffLine::Removed(format!("{}[@kind]: {}", old.name, old.kind.as_str())));
                }
                let stale_side = Some((old.name.as_str(), old.kind));
                diff_entries(&fresh, fresh_side, &old.entries, stale_side, &mut lines);
            }
        }
    }

    for old in stale_groups {
        if !record.groups.iter().any(|g| g.name == old.name) {
            let stale_side = Some((old.name.as_str(), old.kind));
            diff_entries(&[], None, &old.entries, stale_side, &mut lines);
        }
    }

    lines
}
