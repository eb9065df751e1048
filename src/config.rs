use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, InvalidName};
use crate::special::SpecialNames;
use crate::utils::enclosed_in_braces;
use crate::Name;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    special_names: HashMap<String, String>,
}

/// Load name overrides from a TOML configuration file.
///
/// The `[special_names]` table maps the brace-stripped form of a name to a
/// replacement spec. A spec is either a literal replacement, or pipe
/// separated name parts (`"First|von Last|Jr"`) rendered through the usual
/// abbreviation. A missing file is an empty configuration.
pub fn load(path: &Path) -> Result<SpecialNames, Error> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            return Ok(SpecialNames::new());
        }
        Err(source) => return Err(Error::io(path, source)),
    };

    let config: RawConfig =
        toml::from_str(&raw).map_err(|error| Error::config(path, error.to_string()))?;

    let mut specials = SpecialNames::new();
    for (key, spec) in &config.special_names {
        let rendered = render_spec(spec)
            .map_err(|error| Error::config(path, format!("special name {key:?}: {error}")))?;
        specials.insert_override(key, rendered);
    }
    Ok(specials)
}

fn render_spec(spec: &str) -> Result<String, InvalidName> {
    let parts: Vec<&str> = spec.split('|').map(str::trim).collect();

    if let [literal] = parts.as_slice() {
        if literal.contains(' ') && !enclosed_in_braces(literal) {
            return Ok(format!("{{{literal}}}"));
        }
        return Ok((*literal).to_string());
    }

    // "First|von Last|Jr" reads as the comma form "von Last, Jr, First".
    let mut sections = parts[1..].to_vec();
    sections.push(parts[0]);
    let name = Name::parse(&sections.join(", "))?;
    Ok(name.abbreviated().display())
}
