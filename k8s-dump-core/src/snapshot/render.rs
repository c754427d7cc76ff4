use std::{collections::BTreeMap, fmt::Write};

use kube::core::DynamicObject;

pub const DOCUMENT_SEPARATOR: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotScope {
    Namespace(String),
    Cluster,
}

impl SnapshotScope {
    pub fn namespace(&self) -> Option<&str> {
        match self {
            SnapshotScope::Namespace(name) => Some(name),
            SnapshotScope::Cluster => None,
        }
    }
}

/// Everything collected for one output file.
#[derive(Debug)]
pub struct Snapshot {
    pub scope: SnapshotScope,
    pub errors: Vec<String>,
    pub missing: Vec<String>,
    /// Objects keyed by type name; the map ordering is the section ordering.
    pub sections: BTreeMap<String, Vec<DynamicObject>>,
}

impl Snapshot {
    pub fn new(scope: SnapshotScope) -> Self {
        Self {
            scope,
            errors: Vec::new(),
            missing: Vec::new(),
            sections: BTreeMap::new(),
        }
    }

    pub fn object_count(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }
}

/// Renders a snapshot into a multi-document YAML file.
///
/// The file starts with a commented `# errors:` block, followed by the namespace
/// document (namespace snapshots only) and one commented section per type that
/// has objects. Every document is terminated with `---`.
pub fn render(snapshot: &Snapshot) -> Result<String, serde_yaml::Error> {
    let mut output = String::new();

    output.push_str("# errors:\n");
    for error in &snapshot.errors {
        // API reasons may span lines; each one has to stay inside the comment
        for line in error.split(['\n', '\r']).filter(|line| !line.is_empty()) {
            push_line(&mut output, &format!("# {line}"));
        }
    }
    output.push('\n');

    if let SnapshotScope::Namespace(name) = &snapshot.scope {
        output.push_str("# namespace\n");
        output.push_str("apiVersion: v1\n");
        output.push_str("kind: Namespace\n");
        output.push_str("metadata:\n");
        push_line(&mut output, &format!("  name: {name}"));
        output.push('\n');
        push_line(&mut output, DOCUMENT_SEPARATOR);
        output.push('\n');
    }

    for (type_name, objects) in &snapshot.sections {
        if objects.is_empty() {
            continue;
        }

        push_line(&mut output, &format!("# {type_name}"));
        for object in objects {
            let document = serde_yaml::to_string(object)?;
            output.push_str(&document);
            if !document.ends_with('\n') {
                output.push('\n');
            }
            push_line(&mut output, DOCUMENT_SEPARATOR);
        }
        output.push('\n');
    }

    Ok(output)
}

fn push_line(output: &mut String, line: &str) {
    // writing into a String can't fail
    let _ = writeln!(output, "{line}");
}
