//! Grammar packing and segment loading against the emulated device

use hbiflash_core::convert::{build_grammar_image, GrammarSources};
use hbiflash_core::device::VprocDevice;
use hbiflash_core::error::Error;
use hbiflash_core::grammar::loader::load_grammar;
use hbiflash_core::regmap;
use hbiflash_dummy::{DummyConfig, DummyVproc};

fn sample_blob() -> Vec<u8> {
    let trigger_model: Vec<u8> = (0u8..200).collect();
    let command_model: Vec<u8> = (0u8..100).map(|b| b ^ 0x5A).collect();
    build_grammar_image(
        &GrammarSources {
            trigger_model: &trigger_model,
            command_model: &command_model,
            ..Default::default()
        },
        "okay magnolia",
        1,
    )
}

#[test]
fn grammar_streams_into_the_segment_window() {
    let blob = sample_blob();

    let mut port = DummyVproc::new_default();
    let start = port.config().asr_seg_addr;

    let mut dev = VprocDevice::new(&mut port);
    load_grammar(&mut dev, &blob).unwrap();
    drop(dev);

    assert_eq!(port.ext_mem(start, blob.len()), blob);
    assert!(port.asr_enabled());
}

#[test]
fn grammar_appends_a_segment_table_entry() {
    let blob = sample_blob();

    // segment 0 points elsewhere, so the grammar becomes a new segment
    let mut port = DummyVproc::new_default();
    let start = port.config().asr_seg_addr;
    port.set_reg_u32(regmap::ASR_SEG_ADDR_TABLE, 0x0002_0000);

    let mut dev = VprocDevice::new(&mut port);
    load_grammar(&mut dev, &blob).unwrap();
    drop(dev);

    assert_eq!(port.reg(regmap::ASR_SEG_COUNT), 2);
    assert_eq!(
        port.reg_u32(regmap::ASR_SEG_ADDR_TABLE + regmap::ASR_SEG_STRIDE),
        start
    );
    assert_eq!(
        port.reg_u32(regmap::ASR_SEG_SIZE_TABLE + regmap::ASR_SEG_STRIDE),
        blob.len() as u32
    );
}

#[test]
fn grammar_resizes_the_last_segment_in_place() {
    let blob = sample_blob();

    // segment 0 already starts at the grammar window
    let mut port = DummyVproc::new_default();
    let start = port.config().asr_seg_addr;
    port.set_reg_u32(regmap::ASR_SEG_ADDR_TABLE, start);

    let mut dev = VprocDevice::new(&mut port);
    load_grammar(&mut dev, &blob).unwrap();
    drop(dev);

    assert_eq!(port.reg(regmap::ASR_SEG_COUNT), 1);
    assert_eq!(
        port.reg_u32(regmap::ASR_SEG_SIZE_TABLE),
        blob.len() as u32
    );
}

#[test]
fn oversized_grammar_rejected() {
    let mut port = DummyVproc::new(DummyConfig {
        asr_seg_addr: 0x0004_0000,
        asr_max_addr: 0x0004_0000 + 100,
        ..Default::default()
    });
    let mut dev = VprocDevice::new(&mut port);

    // the smallest blob is already two 64-byte headers
    let blob = sample_blob();
    assert_eq!(load_grammar(&mut dev, &blob), Err(Error::Resource));
}

#[test]
fn grammar_requires_running_firmware() {
    let mut port = DummyVproc::new(DummyConfig {
        app_running: false,
        ..Default::default()
    });
    let mut dev = VprocDevice::new(&mut port);

    let blob = sample_blob();
    assert_eq!(load_grammar(&mut dev, &blob), Err(Error::InvalidState));
}
