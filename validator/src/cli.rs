use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
    #[clap(long, help = "The XSD schema file")]
    pub schema: PathBuf,

    #[clap(
        long,
        requires = "parent",
        help = "XML document providing the existing children of the parent element"
    )]
    pub document: Option<PathBuf>,

    #[clap(
        long,
        required_unless_present = "type_name",
        conflicts_with = "type_name",
        help = "Name of the parent element whose children are being edited"
    )]
    pub parent: Option<String>,

    #[clap(
        long = "type",
        help = "Evaluate against the content model of this named complex type instead of a parent element"
    )]
    pub type_name: Option<String>,

    #[clap(long, help = "Name of the element to insert")]
    pub element: String,

    #[clap(long, help = "Allow fetching schema locations over HTTP(S)")]
    pub allow_http: bool,

    #[clap(long, help = "Allow a XML Document Type Definition (DTD) to occur")]
    pub allow_dtd: bool,
}
