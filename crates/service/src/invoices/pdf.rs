//! Invoice layout on top of `genpdf`.
//!
//! DejaVu Sans is embedded, so names and addresses print with their accents.
//! Paragraphs wrap to the page width and the document grows extra pages when
//! a long description or note does not fit.
use genpdf::elements::{Break, Paragraph, TableLayout};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::Style;
use genpdf::{Alignment, Document, Element as _, PaperSize, SimplePageDecorator};
use models::invoice;
use thiserror::Error;

static REGULAR_TTF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static BOLD_TTF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

const BODY_SIZE: u8 = 10;
const MARGIN_MM: i32 = 18;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pdf layout failed: {0}")]
    Pdf(#[from] genpdf::error::Error),
    #[error("invoice file: {0}")]
    Io(#[from] std::io::Error),
    #[error("render task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn font_family() -> Result<FontFamily<FontData>, genpdf::error::Error> {
    let regular = FontData::new(REGULAR_TTF.to_vec(), None)?;
    let bold = FontData::new(BOLD_TTF.to_vec(), None)?;
    Ok(FontFamily { regular: regular.clone(), bold: bold.clone(), italic: regular, bold_italic: bold })
}

/// `1234` -> `12.34`, sign kept.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

fn or_na(v: Option<&str>) -> String {
    v.filter(|s| !s.trim().is_empty()).unwrap_or("N/A").to_string()
}

fn heading(doc: &mut Document, text: &str) {
    doc.push(Break::new(1));
    doc.push(Paragraph::new(text).styled(Style::new().bold().with_font_size(12)));
}

fn amount_row(table: &mut TableLayout, label: &str, value: String, bold: bool) -> Result<(), genpdf::error::Error> {
    let style = if bold { Style::new().bold() } else { Style::new() };
    table
        .row()
        .element(Paragraph::new(label).styled(style))
        .element(Paragraph::new(value).aligned(Alignment::Right).styled(style))
        .push()
}

/// Lay out an invoice the way customers receive it.
pub fn invoice_document(inv: &invoice::Model, currency: &str) -> Result<Document, genpdf::error::Error> {
    let cur = currency.to_ascii_uppercase();
    let money = |c: i64| format!("{} {}", format_cents(c), cur);

    let mut doc = Document::new(font_family()?);
    doc.set_title(format!("Invoice {}", inv.invoice_number));
    doc.set_paper_size(PaperSize::Letter);
    doc.set_font_size(BODY_SIZE);
    doc.set_line_spacing(1.25);
    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(MARGIN_MM);
    doc.set_page_decorator(decorator);

    doc.push(Paragraph::new("INVOICE").styled(Style::new().bold().with_font_size(20)));
    doc.push(Paragraph::new(format!("Invoice #: {}", inv.invoice_number)));
    doc.push(Paragraph::new(format!("Issued: {}", inv.issued_date.format("%Y-%m-%d"))));

    heading(&mut doc, "Service Directory Platform");
    doc.push(Paragraph::new("support@servicedirectory.com"));

    heading(&mut doc, "Bill To:");
    doc.push(Paragraph::new(inv.customer_details.name.as_str()));
    doc.push(Paragraph::new(inv.customer_details.email.as_str()));
    doc.push(Paragraph::new(or_na(inv.customer_details.phone.as_deref())));

    heading(&mut doc, "Service Provider:");
    let provider_name = inv
        .provider_details
        .business_name
        .clone()
        .filter(|b| !b.trim().is_empty())
        .unwrap_or_else(|| inv.provider_details.name.clone());
    doc.push(Paragraph::new(provider_name));
    doc.push(Paragraph::new(inv.provider_details.email.as_str()));
    doc.push(Paragraph::new(or_na(inv.provider_details.phone.as_deref())));

    heading(&mut doc, "Service Details");
    let service_date = inv.service_details.date.map(|d| d.format("%Y-%m-%d").to_string());
    doc.push(Paragraph::new(format!("Service Name: {}", inv.service_details.name)));
    doc.push(Paragraph::new(format!("Description: {}", inv.service_details.description)));
    doc.push(Paragraph::new(format!("Date: {}", or_na(service_date.as_deref()))));
    doc.push(Paragraph::new(format!("Location: {}", inv.service_details.location)));

    heading(&mut doc, "Amount Details:");
    let mut amounts = TableLayout::new(vec![3, 1]);
    amount_row(&mut amounts, "Subtotal", money(inv.subtotal_cents), false)?;
    if inv.tax_cents > 0 {
        amount_row(&mut amounts, "Tax", money(inv.tax_cents), false)?;
    }
    amount_row(&mut amounts, "Platform Fee", money(inv.platform_fee_cents), false)?;
    amount_row(&mut amounts, "Total Amount", money(inv.total_cents), true)?;
    doc.push(amounts);

    heading(&mut doc, "Payment Status:");
    doc.push(Paragraph::new(inv.payment_status.as_str().to_ascii_uppercase()));
    if let Some(paid) = inv.paid_date {
        doc.push(Paragraph::new(format!("Paid on: {}", paid.format("%Y-%m-%d"))));
    }
    if let Some(notes) = inv.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        heading(&mut doc, "Notes:");
        doc.push(Paragraph::new(notes));
    }

    doc.push(Break::new(2));
    let small = Style::new().with_font_size(8);
    doc.push(Paragraph::new("Thank you for using Service Directory!").styled(small));
    doc.push(Paragraph::new("This is an electronically generated invoice.").styled(small));
    Ok(doc)
}

pub fn render_invoice(inv: &invoice::Model, currency: &str) -> Result<Vec<u8>, RenderError> {
    let doc = invoice_document(inv, currency)?;
    let mut buf = Vec::new();
    doc.render(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use models::invoice::{CustomerSnapshot, InvoicePaymentStatus, InvoiceStatus, ProviderSnapshot, ServiceSnapshot};
    use uuid::Uuid;

    fn sample(description: &str) -> invoice::Model {
        let now = Utc::now().into();
        invoice::Model {
            id: Uuid::new_v4(),
            invoice_number: "INV-20240307-0A1B2C3D4".into(),
            payment_id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            service_details: ServiceSnapshot {
                name: "Garden Care".into(),
                description: description.into(),
                price_cents: 8_000,
                date: Some(now),
                location: "Málaga".into(),
            },
            customer_details: CustomerSnapshot { name: "José Müller".into(), email: "jose@example.com".into(), phone: None },
            provider_details: ProviderSnapshot {
                name: "Zoë".into(),
                email: "zoe@example.com".into(),
                phone: Some("555-0101".into()),
                business_name: Some("Zoë's Gärten".into()),
            },
            subtotal_cents: 7_200,
            platform_fee_cents: 800,
            tax_cents: 0,
            total_cents: 8_000,
            status: InvoiceStatus::Draft,
            payment_status: InvoicePaymentStatus::Paid,
            pdf_url: None,
            notes: None,
            due_date: None,
            issued_date: now,
            paid_date: Some(now),
            created_at: now,
        }
    }

    /// Page objects in the output (`/Type /Page`, not `/Pages`).
    fn page_count(bytes: &[u8]) -> usize {
        let needle = b"/Page";
        bytes
            .windows(needle.len() + 1)
            .filter(|w| &w[..needle.len()] == needle && !w[needle.len()].is_ascii_alphanumeric())
            .count()
    }

    #[test]
    fn formats_cents() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(123_456), "1234.56");
        assert_eq!(format_cents(-250), "-2.50");
    }

    #[test]
    fn renders_accented_names_with_embedded_font() {
        let bytes = render_invoice(&sample("Weekly lawn mowing and hedge trimming."), "eur").unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.windows(9).any(|w| w == b"FontFile2"), "TrueType font not embedded");
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn long_description_wraps_onto_more_pages() {
        let long = "Remove weeds from every flower bed, edge the lawn and haul the clippings away. ".repeat(120);
        let bytes = render_invoice(&sample(&long), "usd").unwrap();
        assert!(page_count(&bytes) >= 2, "expected overflow onto a second page");
    }
}
