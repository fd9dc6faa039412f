mod typst;

pub use typst::{TypstCompiler, RECORD_TEMPLATE, REPORT_TEMPLATE};

use std::path::Path;

use crate::error::Result;

/// Everything needed to render one document
#[derive(Debug, Clone)]
pub struct TypstSource {
    pub template: &'static str,
    /// Exposed to the template as `data`
    pub data: serde_json::Value,
    /// Extra files written beside the template, such as a logo
    pub assets: Vec<(String, Vec<u8>)>,
}

/// Turns a document source into a PDF file
pub trait DocumentCompiler {
    fn compile(&self, source: &TypstSource, output_path: &Path) -> Result<()>;
}
