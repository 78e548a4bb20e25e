use std::collections::HashSet;

use roxmltree::Node;

use crate::error::SchemaError;

/// Turns a `schemaLocation` into schema text. The core performs no I/O of its own; callers
/// decide what a location means (file, HTTP, in-memory fixture, ...). Returning `None` lets the
/// next resolver in line try.
pub trait ImportResolver {
    fn resolve(&self, location: &str) -> Option<String>;
}

/// The `include`/`import` composition elements (§4.2.3, §4.2.6); not schema components
/// themselves.
#[derive(Clone, Debug)]
pub struct Import {
    pub namespace: Option<String>,
    pub schema_location: Option<String>,
}

impl Import {
    pub(crate) fn collect(schema: Node) -> Result<Vec<Import>, SchemaError> {
        let mut imports = Vec::new();
        for child in schema.children().filter(|child| child.is_element()) {
            match child.tag_name().name() {
                "include" => {
                    let schema_location =
                        child
                            .attribute("schemaLocation")
                            .ok_or(SchemaError::MissingAttribute {
                                element: "include",
                                attribute: "schemaLocation",
                            })?;
                    imports.push(Import {
                        namespace: None,
                        schema_location: Some(schema_location.to_string()),
                    });
                }
                "import" => {
                    // An import without a schemaLocation declares that components of the
                    // namespace come from elsewhere; there is nothing to fetch.
                    imports.push(Import {
                        namespace: child.attribute("namespace").map(str::to_string),
                        schema_location: child.attribute("schemaLocation").map(str::to_string),
                    });
                }
                _ => {}
            }
        }
        Ok(imports)
    }
}

/// Resolves every reachable include/import to its text, transitively. Each location is fetched
/// once; a location that revisits itself is simply skipped, so mutually including documents do
/// not recurse forever.
pub(crate) fn resolve_transitive(
    root: Node,
    resolvers: &[Box<dyn ImportResolver>],
) -> Result<Vec<String>, SchemaError> {
    let mut texts = Vec::new();
    let mut seen = HashSet::new();
    let mut queue: Vec<String> = Import::collect(root)?
        .into_iter()
        .filter_map(|import| import.schema_location)
        .collect();

    while let Some(location) = queue.pop() {
        if !seen.insert(location.clone()) {
            continue;
        }
        let text = resolvers
            .iter()
            .find_map(|resolver| resolver.resolve(&location))
            .ok_or_else(|| SchemaError::UnresolvedImport(location.clone()))?;
        {
            let document = roxmltree::Document::parse(&text)?;
            queue.extend(
                Import::collect(document.root_element())?
                    .into_iter()
                    .filter_map(|import| import.schema_location),
            );
        }
        texts.push(text);
    }

    Ok(texts)
}
