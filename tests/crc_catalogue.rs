//! Cross check the parameterized CRCs against the catalogue of the `crc` crate.
mod common;

use crc::{
    Crc, CRC_16_ARC, CRC_16_IBM_3740, CRC_16_KERMIT, CRC_16_MODBUS, CRC_16_XMODEM, CRC_4_INTERLAKEN,
    CRC_7_MMC, CRC_8_MAXIM_DOW, CRC_8_NRSC_5, CRC_8_SMBUS,
};
use rand::Rng;
use rfdecode::integrity::{crc16, crc16lsb, crc4, crc7, crc8, crc8le};

use common::rng;

fn messages() -> Vec<Vec<u8>> {
    let mut rng = rng();
    let mut out = vec![Vec::new(), b"123456789".to_vec()];
    for _ in 0..50 {
        let mut msg = vec![0u8; rng.gen_range(1..128)];
        rng.fill(&mut msg[..]);
        out.push(msg);
    }
    out
}

#[test]
fn crc8_variants() {
    let maxim = Crc::<u8>::new(&CRC_8_MAXIM_DOW);
    let smbus = Crc::<u8>::new(&CRC_8_SMBUS);
    let nrsc5 = Crc::<u8>::new(&CRC_8_NRSC_5);
    for msg in messages() {
        assert_eq!(crc8le(&msg, 0x31, 0x00), maxim.checksum(&msg));
        assert_eq!(crc8(&msg, 0x07, 0x00), smbus.checksum(&msg));
        assert_eq!(crc8(&msg, 0x31, 0xff), nrsc5.checksum(&msg));
    }
}

#[test]
fn crc16_variants() {
    let kermit = Crc::<u16>::new(&CRC_16_KERMIT);
    let arc = Crc::<u16>::new(&CRC_16_ARC);
    let modbus = Crc::<u16>::new(&CRC_16_MODBUS);
    let ccitt = Crc::<u16>::new(&CRC_16_IBM_3740);
    let xmodem = Crc::<u16>::new(&CRC_16_XMODEM);
    for msg in messages() {
        assert_eq!(crc16lsb(&msg, 0x8408, 0x0000), kermit.checksum(&msg));
        assert_eq!(crc16lsb(&msg, 0xa001, 0x0000), arc.checksum(&msg));
        assert_eq!(crc16lsb(&msg, 0xa001, 0xffff), modbus.checksum(&msg));
        assert_eq!(crc16(&msg, 0x1021, 0xffff), ccitt.checksum(&msg));
        assert_eq!(crc16(&msg, 0x1021, 0x0000), xmodem.checksum(&msg));
    }
}

#[test]
fn narrow_crcs() {
    let mmc = Crc::<u8>::new(&CRC_7_MMC);
    // Interlaken inverts the register before and after
    let interlaken = Crc::<u8>::new(&CRC_4_INTERLAKEN);
    for msg in messages() {
        assert_eq!(crc7(&msg, 0x09, 0x00), mmc.checksum(&msg));
        assert_eq!(crc4(&msg, 0x3, 0xf) ^ 0xf, interlaken.checksum(&msg));
    }
}
