use anyhow::Result;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::models::{Customer, Invoice, Job, TAX_RATE_BPS};

/// Service for writing invoices out as Markdown documents
pub struct InvoiceGenerator {
    output_dir: PathBuf,
}

impl InvoiceGenerator {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        // Create the output directory if it doesn't exist
        let path = output_dir.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        Ok(Self {
            output_dir: path.to_path_buf(),
        })
    }

    /// Write `invoice_<id>.md` and return its path
    pub fn generate_invoice(&self, invoice: &Invoice, job: &Job, customer: &Customer) -> Result<PathBuf> {
        let markdown = render_markdown(invoice, job, customer);

        let md_path = self.output_dir.join(format!("invoice_{}.md", invoice.id));
        let mut file = File::create(&md_path)?;
        file.write_all(markdown.as_bytes())?;

        tracing::info!(invoice_id = %invoice.id, path = %md_path.display(), "invoice written");
        Ok(md_path)
    }
}

/// Render an invoice with its job and customer as Markdown
pub fn render_markdown(invoice: &Invoice, job: &Job, customer: &Customer) -> String {
    let mut content = String::new();

    content.push_str("<hr style=\"height: 5px; background-color: #343876; border: none;\">\n\n");

    content.push_str(&format!("# Invoice {}\n", invoice.id));
    content.push_str(&format!("Job #{} ({}) on {}, {}\n\n", job.id, job.kind, job.date.format("%m/%d/%Y"), job.time_window()));
    content.push_str(&format!("{}\n\n", job.description));

    if invoice.is_offline {
        content.push_str("> **Draft saved locally.** Will sync when online.\n\n");
    }

    // Bill-to block
    content.push_str("**Invoice for**<br>\n");
    content.push_str(&format!("{}<br>\n", customer.name));
    content.push_str(&format!("{}, {}<br>\n", customer.address, customer.city));
    content.push_str(&format!("{} / {}\n\n", customer.phone, customer.email));

    content.push_str("<hr>\n\n");

    // Line items
    content.push_str("| Item | Qty | Unit price | Total |\n");
    content.push_str("|:-----|----:|-----------:|------:|\n");
    for item in &invoice.items {
        content.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            table_cell(&item.name),
            item.quantity,
            item.unit_price,
            item.total()
        ));
    }
    content.push('\n');

    content.push_str(&format!("Subtotal: {}<br>\n", invoice.subtotal()));
    content.push_str(&format!(
        "Tax ({}%): {}<br>\n",
        TAX_RATE_BPS as f64 / 100.0,
        invoice.tax()
    ));
    content.push_str(&format!("## Total: {}\n\n", invoice.total()));

    content.push_str(&format!("Status: **{}**", invoice.status));
    if let Some(method) = invoice.payment_method {
        content.push_str(&format!(" via {}", method));
    }
    content.push('\n');

    content
}

/// Keep free text from splitting a Markdown table row.
fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
