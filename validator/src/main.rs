mod cli;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use quick_xml::events::{BytesStart, Event};
use quick_xml::NsReader;
use xfb_xsd::xstypes::QName;
use xfb_xsd::{insertion_points, ImportResolver, InsertOrderTree, TypeDefinition};

/// Resolves relative schema locations against the directory of the entry schema.
struct FileImportResolver {
    base: PathBuf,
}

impl ImportResolver for FileImportResolver {
    fn resolve(&self, location: &str) -> Option<String> {
        if location.starts_with("http://") || location.starts_with("https://") {
            return None;
        }
        fs::read_to_string(self.base.join(location)).ok()
    }
}

/// Fetches http(s) schema locations; only active with --allow-http.
struct HttpImportResolver;

impl ImportResolver for HttpImportResolver {
    fn resolve(&self, location: &str) -> Option<String> {
        if !location.starts_with("http://") && !location.starts_with("https://") {
            return None;
        }
        let response = reqwest::blocking::get(location).ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.text().ok()
    }
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let text = match fs::read_to_string(&cli.schema) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("error: cannot read {}: {error}", cli.schema.display());
            return ExitCode::from(2);
        }
    };
    let options = roxmltree::ParsingOptions {
        allow_dtd: cli.allow_dtd,
        ..Default::default()
    };
    let document = match roxmltree::Document::parse_with_options(&text, options) {
        Ok(document) => document,
        Err(error) => {
            eprintln!("error: {}: {error}", cli.schema.display());
            return ExitCode::from(2);
        }
    };

    let mut resolvers: Vec<Box<dyn ImportResolver>> = Vec::new();
    resolvers.push(Box::new(FileImportResolver {
        base: cli
            .schema
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf(),
    }));
    if cli.allow_http {
        resolvers.push(Box::new(HttpImportResolver));
    }

    let (schema, components) = match xfb_xsd::read_schema(&document, &resolvers) {
        Ok(parsed) => parsed,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::from(2);
        }
    };

    let siblings = match (&cli.document, &cli.parent) {
        (Some(path), Some(parent)) => match child_names(path, parent) {
            Ok(Some(names)) => names,
            Ok(None) => {
                eprintln!("error: no <{parent}> element in {}", path.display());
                return ExitCode::from(2);
            }
            Err(error) => {
                eprintln!("error: cannot read {}: {error}", path.display());
                return ExitCode::from(2);
            }
        },
        _ => Vec::new(),
    };

    let tree = if let Some(type_name) = &cli.type_name {
        let name = QName::with_optional_namespace(schema.target_namespace.clone(), type_name);
        let content_model = match schema.type_definition(&name) {
            Some(TypeDefinition::Complex(definition)) => definition.get(&components).content_model,
            _ => None,
        };
        let Some(particle) = content_model else {
            eprintln!("error: the schema declares no complex type named {type_name:?} with element content");
            return ExitCode::from(2);
        };
        InsertOrderTree::from_particle(&schema, &components, particle)
    } else {
        // clap guarantees --parent is present when --type is not.
        let parent = cli.parent.as_deref().unwrap_or_default();
        match InsertOrderTree::for_element(&schema, &components, parent) {
            Some(tree) => tree,
            None => {
                eprintln!("error: the schema declares no element named {parent:?}");
                return ExitCode::from(2);
            }
        }
    };

    let siblings: Vec<&str> = siblings.iter().map(String::as_str).collect();
    match insertion_points(&tree, &siblings, &cli.element) {
        Ok(points) => {
            let rendered: Vec<String> = points.iter().map(|point| point.to_string()).collect();
            println!("{}", rendered.join(" "));
            ExitCode::SUCCESS
        }
        Err(denied) => {
            eprintln!("refused: {denied}");
            ExitCode::FAILURE
        }
    }
}

/// Streams the document and collects the local names of the direct children of the first
/// element named `parent`, in document order. Returns None when no such element occurs.
fn child_names(path: &Path, parent: &str) -> Result<Option<Vec<String>>, quick_xml::Error> {
    let mut reader = NsReader::from_file(path)?;
    let mut buffer = Vec::new();
    let mut depth = 0usize;
    let mut children_depth = None;
    let mut names = Vec::new();

    loop {
        match reader.read_event_into(&mut buffer)? {
            Event::Start(tag) => {
                let name = local_name(&tag);
                match children_depth {
                    Some(at) if depth == at => names.push(name),
                    None if name == parent => children_depth = Some(depth + 1),
                    _ => {}
                }
                depth += 1;
            }
            Event::Empty(tag) => {
                let name = local_name(&tag);
                match children_depth {
                    Some(at) if depth == at => names.push(name),
                    // An empty parent element has no children at all.
                    None if name == parent => return Ok(Some(Vec::new())),
                    _ => {}
                }
            }
            Event::End(_) => {
                depth -= 1;
                if children_depth == Some(depth + 1) {
                    return Ok(Some(names));
                }
            }
            Event::Eof => return Ok(children_depth.map(|_| names)),
            _ => {}
        }
        buffer.clear();
    }
}

fn local_name(tag: &BytesStart) -> String {
    String::from_utf8_lossy(tag.local_name().as_ref()).into_owned()
}
