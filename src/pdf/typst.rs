use std::path::{Path, PathBuf};
use std::process::Command;

use super::{DocumentCompiler, TypstSource};
use crate::error::{BillingError, Result};

/// Embedded Typst template for the invoice report.
/// Data is loaded from a JSON file placed next to the template.
pub const REPORT_TEMPLATE: &str = r##"// Invoice Report Template

#let data = json("DATA_JSON_PATH")

#set document(title: data.title, date: none)

#set page(
  paper: "us-letter",
  flipped: true,
  margin: (top: 0.75in, bottom: 0.9in, left: 0.6in, right: 0.6in),
  footer: context [
    #set text(size: 8pt, fill: gray)
    #data.firm_name
    #h(1fr)
    Page #counter(page).display() of #counter(page).final().first()
  ],
)

#set text(font: "Helvetica", size: 9pt)

// Title block
#grid(
  columns: (1fr, auto),
  align: (left, right),
  [
    #text(size: 18pt, weight: "bold")[#data.title]
    #v(0.2em)
    #data.firm_name
  ],
  [
    #text(size: 9pt, fill: gray)[Generated #data.generated_at]
  ]
)

#v(0.5em)
#line(length: 100%, stroke: 0.5pt + gray)
#v(0.8em)

// Aggregate summary
#text(weight: "bold", size: 11pt)[Summary]
#v(0.3em)
#table(
  columns: (auto, auto),
  stroke: none,
  align: (left, right),
  inset: 4pt,
  ..data.summary.map(entry => (entry.label, entry.value)).flatten()
)

#v(1em)

// Invoice listing; the header row repeats on every page
#table(
  columns: (auto, 1fr, auto, auto, auto, auto, auto, auto),
  align: (left, left, right, right, right, center, left, left),
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else { (bottom: 0.5pt + gray) },
  inset: 6pt,
  fill: (x, y) => if y == 0 { luma(240) } else { none },

  table.header(
    [*Number*], [*Client*], [*Amount*], [*Paid*], [*Remaining*], [*Status*], [*Issued*], [*Due*],
  ),

  ..data.rows.map(row => (
    row.number,
    row.client,
    row.amount,
    row.paid,
    row.remaining,
    row.status,
    row.issue_date,
    row.due_date,
  )).flatten()
)
"##;

/// Embedded Typst template for a single invoice or payment receipt
pub const RECORD_TEMPLATE: &str = r##"// Single Record Template

#let data = json("DATA_JSON_PATH")

#set document(title: data.title + " " + data.reference, date: none)

#set page(
  paper: "us-letter",
  margin: (top: 1in, bottom: 1in, left: 1in, right: 1in),
  footer: context [
    #set text(size: 8pt, fill: gray)
    #h(1fr)
    Page #counter(page).display() of #counter(page).final().first()
  ],
)

#set text(font: "Helvetica", size: 10pt)

// Letterhead and document details
#grid(
  columns: (1fr, 1fr),
  align: (left, right),
  [
    #if data.letterhead.logo != none {
      image(data.letterhead.logo, height: 0.8in)
    } else {
      box(
        width: 0.8in,
        height: 0.8in,
        fill: luma(230),
        radius: 4pt,
        align(center + horizon, text(size: 20pt, weight: "bold")[#data.letterhead.initials]),
      )
    }
    #v(0.3em)
    #text(size: 14pt, weight: "bold")[#data.letterhead.firm_name]
  ],
  [
    #text(size: 22pt, weight: "bold")[#data.title]
    #v(0.5em)
    #table(
      columns: (auto, auto),
      stroke: none,
      align: (right, left),
      inset: 2pt,
      ..data.details.map(d => ([*#d.label:*], d.value)).flatten()
    )
  ]
)

#v(1em)
#line(length: 100%, stroke: 0.5pt + gray)
#v(1em)

// Bill To section
#text(weight: "bold", size: 11pt)[Bill To:]
#v(0.3em)
#text(weight: "bold")[#data.bill_to.name]
#for entry in data.bill_to.lines [
  \ #entry
]

#v(1.5em)

// Line items table
#table(
  columns: (auto, 1fr, auto, auto, auto),
  align: (center, left, right, right, right),
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else { (bottom: 0.5pt + gray) },
  inset: 8pt,
  fill: (x, y) => if y == 0 { luma(240) } else { none },

  table.header([*\#*], [*Description*], [*Qty*], [*Rate*], [*Amount*]),

  ..data.items.enumerate().map(((i, item)) => (
    str(i + 1),
    item.description,
    str(item.quantity),
    item.rate,
    item.amount,
  )).flatten()
)

#v(1em)

// Totals
#align(right)[
  #table(
    columns: (auto, auto),
    stroke: none,
    align: (right, right),
    inset: 6pt,
    ..data.totals.map(t => if t.emphasis {
      (table.hline(stroke: 1pt), [*#t.label:*], [*#t.value*])
    } else {
      ([#t.label:], t.value)
    }).flatten()
  )
]
"##;

/// Compiles documents with the Typst CLI
pub struct TypstCompiler {
    pub binary: String,
}

impl Default for TypstCompiler {
    fn default() -> Self {
        Self {
            binary: "typst".to_string(),
        }
    }
}

impl TypstCompiler {
    fn workspace() -> PathBuf {
        std::env::temp_dir().join(format!("billing-typst-{}", std::process::id()))
    }
}

impl DocumentCompiler for TypstCompiler {
    fn compile(&self, source: &TypstSource, output_path: &Path) -> Result<()> {
        // Check if typst is available
        if Command::new(&self.binary).arg("--version").output().is_err() {
            return Err(BillingError::TypstNotFound);
        }

        let temp_dir = Self::workspace();
        std::fs::create_dir_all(&temp_dir)?;

        // Serialize document data to JSON beside the template
        let json_data = serde_json::to_string(&source.data)
            .map_err(|e| BillingError::PdfGeneration(e.to_string()))?;
        let json_path = temp_dir.join("data.json");
        std::fs::write(&json_path, &json_data)?;

        for (name, bytes) in &source.assets {
            std::fs::write(temp_dir.join(name), bytes)?;
        }

        let template_content = source.template.replace("DATA_JSON_PATH", "data.json");
        let template_path = temp_dir.join("document.typ");
        std::fs::write(&template_path, &template_content)?;

        tracing::debug!(output = %output_path.display(), "compiling document with typst");

        let output = Command::new(&self.binary)
            .arg("compile")
            .arg("--root")
            .arg(&temp_dir)
            .arg(&template_path)
            .arg(output_path)
            .output();

        // Clean up temp files whatever the result
        let _ = std::fs::remove_dir_all(&temp_dir);

        let output = output?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BillingError::PdfGeneration(stderr.to_string()));
        }

        Ok(())
    }
}
