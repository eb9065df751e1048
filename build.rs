use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct LatexData {
    unicode_to_latex: HashMap<String, String>,
}

type Result<T> = std::result::Result<T, Box<dyn Error>>;

fn main() -> Result<()> {
    let input = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let output = PathBuf::from(env::var("OUT_DIR")?);

    let json = read_file(&input, "build/latex_data.json")?;
    let data: LatexData = serde_json::from_str(&json)?;

    let mut builder = phf_codegen::Map::new();
    for (key, value) in &data.unicode_to_latex {
        let mut chars = key.chars();
        let c = chars.next().ok_or("empty key in unicode_to_latex")?;
        if chars.next().is_some() {
            return Err(format!("multi-character key in unicode_to_latex: {key:?}").into());
        }
        builder.entry(c, &format!("{value:?}"));
    }
    fs::write(
        output.join("unicode_to_latex.rs"),
        format!("{}", builder.build()),
    )?;

    Ok(())
}

fn read_file(input_dir: &Path, file_path: &str) -> Result<String> {
    println!("cargo:rerun-if-changed={}", file_path);
    let s = fs::read_to_string(input_dir.join(file_path))?;
    Ok(s)
}
