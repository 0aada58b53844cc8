//! Text extraction for selected documents.
//!
//! Plain-text formats are decoded directly and DOCX files are read from
//! their `word/document.xml` entry. PDF and legacy DOC files have no parser
//! yet, so they produce a placeholder that names the file.

use std::io::{Cursor, Read};

use anyhow::{anyhow, bail, Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use zip::read::ZipArchive;

use crate::document::{Document, DocumentExtension};
use crate::encoding::decode_text;

const DOCX_BODY_ENTRY: &str = "word/document.xml";

static PARAGRAPH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<w:p(?:\s[^>]*)?/>|<w:p(?:\s[^>]*)?>(.*?)</w:p>")
        .expect("valid paragraph regex")
});

static RUN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:tab\s*/>|<w:br(?:\s[^>]*)?/>")
        .expect("valid run regex")
});

static ENTITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);").expect("valid entity regex")
});

/// Extract the readable text of a document.
pub fn extract_text(document: &Document) -> Result<String> {
    let Some(extension) = document.extension() else {
        bail!("unsupported document type: {}", document.name());
    };

    match extension {
        ext if ext.is_plain_text() => Ok(decode_text(document.content()).0),
        DocumentExtension::Docx => extract_docx_text(document.content())
            .with_context(|| format!("failed to read {}", document.name())),
        _ => Ok(simulated_extraction(document.name())),
    }
}

/// Paragraph text of a DOCX container, one line per paragraph.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).context("not a DOCX container")?;
    let mut entry = archive
        .by_name(DOCX_BODY_ENTRY)
        .map_err(|_| anyhow!("missing {DOCX_BODY_ENTRY}"))?;

    let mut xml = String::with_capacity(entry.size() as usize);
    entry
        .read_to_string(&mut xml)
        .context("document body is not valid UTF-8")?;

    let paragraphs: Vec<String> = PARAGRAPH_REGEX
        .captures_iter(&xml)
        .map(|caps| caps.get(1).map(|body| paragraph_text(body.as_str())).unwrap_or_default())
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(body: &str) -> String {
    let mut text = String::new();
    for caps in RUN_REGEX.captures_iter(body) {
        match caps.get(1) {
            Some(run) => text.push_str(&decode_entities(run.as_str())),
            None if caps[0].starts_with("<w:tab") => text.push('\t'),
            None => text.push('\n'),
        }
    }
    text
}

fn decode_entities(input: &str) -> String {
    ENTITY_REGEX
        .replace_all(input, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ if entity.starts_with("#x") => u32::from_str_radix(&entity[2..], 16)
                    .ok()
                    .and_then(char::from_u32),
                _ => entity[1..].parse::<u32>().ok().and_then(char::from_u32),
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn simulated_extraction(file_name: &str) -> String {
    format!(
        "[Simulated content from {file_name}]\n\n\
         This is a sample medical document text that would be extracted from the uploaded file. \
         In a production environment, this would use appropriate parsing libraries to extract \
         text from PDF, DOC, and other document formats."
    )
}
