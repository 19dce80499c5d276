//! The `markgrade init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("markgrade.toml").exists() {
        println!("markgrade.toml already exists, skipping.");
    } else {
        std::fs::write("markgrade.toml", SAMPLE_CONFIG)?;
        println!("Created markgrade.toml");
    }

    println!("\nNext steps:");
    println!("  1. Check the key parses: markgrade parse-key --key answer-key.docx");
    println!("  2. Grade: markgrade grade --key answer-key.docx --submissions scans/*.jpg");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# markgrade configuration

alphabet = "ABCD"
# expected_questions = 40
min_ocr_chars = 2
collaborator_timeout_secs = 30
parallelism = 4
output_dir = "./markgrade-results"

# "placeholder" assigns random answers (mark recognition is not implemented);
# "document" reads typed answers from PDF, DOCX or TXT submissions.
detector = "placeholder"
# placeholder_seed = 42

[ocr]
enabled = false
program = "tesseract"
language = "eng"
page_seg_mode = 7

[pdf]
program = "pdftotext"
"#;
