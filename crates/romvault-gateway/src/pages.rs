//! HTML pages rendered from embedded templates.
//!
//! Templates are read once when [`Pages::load`] runs at startup and the
//! resulting value is shared through the application state.

use std::borrow::Cow;

use rust_embed::RustEmbed;

use crate::error::AppError;
use crate::roms::{prettify, RomEntry};

#[derive(RustEmbed)]
#[folder = "web/templates"]
struct Templates;

/// Parsed page templates.
#[derive(Debug, Clone)]
pub struct Pages {
    index: String,
    play: String,
    rom_item: String,
}

impl Pages {
    /// Load the embedded templates.
    pub fn load() -> Result<Self, AppError> {
        Ok(Self {
            index: template("index.html")?,
            play: template("play.html")?,
            rom_item: template("rom_item.html")?,
        })
    }

    /// Landing page listing the ROM library.
    pub fn index(&self, roms: &[RomEntry]) -> String {
        let items: String = roms
            .iter()
            .map(|rom| {
                render(
                    &self.rom_item,
                    &[
                        ("href", attribute(&play_href(&rom.file_name))),
                        ("name", text(&rom.name)),
                        ("file_name", text(&rom.file_name)),
                    ],
                )
            })
            .collect();

        render(
            &self.index,
            &[
                ("count", Cow::Owned(roms.len().to_string())),
                ("roms", Cow::Owned(items)),
            ],
        )
    }

    /// Player page for one ROM.
    pub fn play(&self, rom: &str) -> String {
        render(
            &self.play,
            &[
                ("rom", attribute(rom)),
                ("name", text(&prettify(rom))),
            ],
        )
    }
}

fn template(name: &str) -> Result<String, AppError> {
    let file = Templates::get(name)
        .ok_or_else(|| AppError::Internal(format!("missing template {name}")))?;
    String::from_utf8(file.data.into_owned())
        .map_err(|e| AppError::Internal(format!("template {name} is not UTF-8: {e}")))
}

fn text(value: &str) -> Cow<'_, str> {
    html_escape::encode_text(value)
}

fn attribute(value: &str) -> Cow<'static, str> {
    Cow::Owned(html_escape::encode_double_quoted_attribute(value).into_owned())
}

/// Substitute `{{key}}` placeholders in a single pass. Unknown keys are left as is.
fn render(template: &str, vars: &[(&str, Cow<'_, str>)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = after[..end].trim();
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

fn play_href(file_name: &str) -> String {
    format!("/play/{}", encode_path_segment(file_name))
}

/// Percent-encode a URL path segment (RFC 3986 unreserved characters pass through).
fn encode_path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
