//! Register access and host command handshake against the emulated device

use hbiflash_core::device::{DeviceEndian, VprocDevice};
use hbiflash_core::error::Error;
use hbiflash_core::hostcmd::{self, POLL_BOUND};
use hbiflash_core::port::{HbiPort, PortFeatures};
use hbiflash_core::regmap;
use hbiflash_dummy::{DummyConfig, DummyVproc};

#[test]
fn emulated_port_is_full_duplex() {
    let port = DummyVproc::new_default();
    assert!(port.features().contains(PortFeatures::FULL_DUPLEX));
}

#[test]
fn register_round_trip_is_endian_independent() {
    for endian in [DeviceEndian::Big, DeviceEndian::Little] {
        let mut port = DummyVproc::new_default();
        let mut dev = VprocDevice::with_endian(&mut port, endian);

        let written = [0x1122u16, 0x3344, 0xABCD];
        dev.write_words(0x0300, &written).unwrap();

        let mut read = [0u16; 3];
        dev.read_words(0x0300, &mut read).unwrap();
        assert_eq!(read, written, "round trip failed for {:?}", endian);
    }
}

#[test]
fn direct_and_paged_access_reach_the_same_register_file() {
    let mut port = DummyVproc::new_default();
    let mut dev = VprocDevice::new(&mut port);

    dev.write_reg(0x000E, 0xBEEF).unwrap();
    dev.write_reg(0x0412, 0xCAFE).unwrap();
    drop(dev);

    assert_eq!(port.reg(0x000E), 0xBEEF);
    assert_eq!(port.reg(0x0412), 0xCAFE);
}

#[test]
fn u32_registers_read_high_word_first() {
    let mut port = DummyVproc::new_default();
    port.set_reg_u32(0x0144, 0x0004_0000);

    let mut dev = VprocDevice::new(&mut port);
    assert_eq!(dev.read_u32(0x0144).unwrap(), 0x0004_0000);

    dev.write_u32(0x0148, 0x1234_5678).unwrap();
    drop(dev);
    assert_eq!(port.reg(0x0148), 0x1234);
    assert_eq!(port.reg(0x014A), 0x5678);
}

#[test]
fn oversized_access_rejected() {
    let mut port = DummyVproc::new_default();
    let mut dev = VprocDevice::new(&mut port);

    let words = [0u16; 129]; // 258 bytes
    assert_eq!(dev.write_words(0x0300, &words), Err(Error::InvalidArgument));
}

#[test]
fn host_command_runs_through_the_mailbox() {
    let mut port = DummyVproc::new_default();
    let mut dev = VprocDevice::new(&mut port);

    hostcmd::run_host_command(&mut dev, hostcmd::cmd::FLASH_INIT).unwrap();
    assert_eq!(hostcmd::command_result(&mut dev).unwrap(), 0x6000);
    drop(dev);

    assert_eq!(port.reg(regmap::HOST_CMD), 0);
}

#[test]
fn busy_device_fails_after_exactly_the_poll_bound() {
    let mut port = DummyVproc::new(DummyConfig {
        hold_busy: true,
        ..Default::default()
    });
    let mut dev = VprocDevice::new(&mut port);

    let result = hostcmd::run_host_command(&mut dev, hostcmd::cmd::FLASH_INIT);
    assert_eq!(result, Err(Error::Resource));
    drop(dev);

    // one status read per iteration, not fewer or more
    assert_eq!(port.read_count(regmap::HOST_SW_FLAGS), POLL_BOUND);
}
