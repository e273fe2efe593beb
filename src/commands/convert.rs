//! Offline conversion commands

use std::path::{Path, PathBuf};

use hbiflash_core::convert::{self, GrammarSources};

/// Compile a source file into a loadable image, keyed by its extension
pub fn run(
    input: &Path,
    output: &Path,
    block_size: Option<u16>,
    device_code: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let ext = input.extension().and_then(|e| e.to_str()).unwrap_or("");
    let source = std::fs::read_to_string(input)?;

    log::info!("{} conversion in progress...", input.display());

    let image = match ext {
        "s3" => {
            if device_code == 0 {
                log::warn!("no device code given (-f); the image header will carry 0");
            }
            let mut block = block_size.unwrap_or(16);
            if !convert::is_valid_firmware_block_size(block) {
                log::warn!(
                    "invalid firmware block size {} (must be 16*2^n words, n <= 3), using 16",
                    block
                );
                block = 16;
            }
            convert::compile_firmware(&source, block, device_code)?
        }
        "cr2" => {
            let mut block = block_size.unwrap_or(1);
            if !convert::is_valid_config_block_size(block) {
                log::warn!(
                    "invalid config block size {} (must be 2^n words, n <= 7), using 1",
                    block
                );
                block = 1;
            }
            convert::compile_config(&source, block, device_code)?
        }
        other => {
            return Err(format!(
                "unrecognized input extension '{}' (expected .s3 or .cr2)",
                other
            )
            .into())
        }
    };

    std::fs::write(output, &image)?;
    println!(
        "{} converted: {} bytes written to {}",
        input.display(),
        image.len(),
        output.display()
    );
    Ok(())
}

/// Pack acoustic model files into a grammar blob
pub fn run_pack_grammar(
    trigger: Option<&Path>,
    command: Option<&Path>,
    output: &Path,
    description: &str,
    version: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    if trigger.is_none() && command.is_none() {
        return Err("at least one acoustic model is required (--trigger/--command)".into());
    }

    let trigger_model = read_model(trigger)?;
    let trigger_params = read_params(trigger)?;
    let command_model = read_model(command)?;
    let command_params = read_params(command)?;

    let blob = convert::build_grammar_image(
        &GrammarSources {
            trigger_model: &trigger_model,
            trigger_params: &trigger_params,
            command_model: &command_model,
            command_params: &command_params,
        },
        description,
        version,
    );

    std::fs::write(output, &blob)?;
    println!("Grammar blob: {} bytes written to {}", blob.len(), output.display());
    Ok(())
}

fn read_model(path: Option<&Path>) -> std::io::Result<Vec<u8>> {
    match path {
        Some(p) => std::fs::read(p),
        None => Ok(Vec::new()),
    }
}

/// Parameter blobs live next to their model as `<stem>_params.bin`
fn read_params(model: Option<&Path>) -> std::io::Result<Vec<u8>> {
    let Some(model) = model else {
        return Ok(Vec::new());
    };
    let stem = model
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let candidate: PathBuf = model.with_file_name(format!("{}_params.bin", stem));
    if candidate.exists() {
        log::info!("including parameter blob {}", candidate.display());
        std::fs::read(&candidate)
    } else {
        Ok(Vec::new())
    }
}
