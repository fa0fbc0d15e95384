mod common;

use rfdecode::{
    bitbuffer::BitBuffer,
    decoder::{DecodeError, Decoder},
    devices::{Bresser3ch, FineOffsetWs80, TfaTwinPlus},
    registry::{DispatchConfig, Dispatcher, Registry},
};

use common::load_captures;

#[test]
fn captures_decode_to_expected_model() {
    let registry = Registry::with_reference_devices();
    for capture in load_captures("captures.txt") {
        let records = registry.decode(&capture.bits);
        let models: Vec<&str> = records.iter().map(|r| r.model()).collect();
        assert_eq!(
            models,
            [capture.model.as_str()],
            "line {}: {}",
            capture.line,
            capture.bits
        );
        let protocol = registry
            .protocols()
            .find(|p| p.name() == capture.model)
            .unwrap();
        assert!(protocol.conforms(&records[0]), "line {}", capture.line);
    }
}

#[test]
fn dispatcher_agrees_with_registry() {
    let captures = load_captures("captures.txt");
    let buffers: Vec<BitBuffer> = captures.iter().map(|c| c.bits.clone()).collect();
    let dispatcher = Dispatcher::new(
        Registry::with_reference_devices(),
        &DispatchConfig::builder().num_threads(4).build(),
    )
    .unwrap();
    let sequential = Registry::with_reference_devices();

    let all = dispatcher.decode_all(&buffers);
    assert_eq!(all.len(), buffers.len());
    for (bits, records) in buffers.iter().zip(&all) {
        assert_eq!(records, &sequential.decode(bits));
        assert_eq!(records, &dispatcher.decode(bits));
    }
}

#[test]
fn stats_count_outcomes() {
    let registry = Registry::with_reference_devices();
    let good: BitBuffer = "{36}e44b707300".parse().unwrap();
    let bad: BitBuffer = "{36}e44b707310".parse().unwrap();
    assert_eq!(registry.decode(&good).len(), 1);
    assert!(registry.decode(&bad).is_empty());
    assert!(registry.decode(&bad).is_empty());

    let stats = registry.stats("TFA-TwinPlus").unwrap();
    assert_eq!(stats.events, 3);
    assert_eq!(stats.ok, 1);
    assert_eq!(stats.failures(DecodeError::FailMic), 2);

    let stats = registry.stats("Fineoffset-WS80").unwrap();
    assert_eq!(stats.events, 3);
    assert_eq!(stats.failures(DecodeError::AbortLength), 3);
}

#[test]
fn disabled_decoder_is_skipped() {
    let registry = Registry::with_reference_devices();
    registry.set_enabled("TFA-TwinPlus", false).unwrap();
    assert!(registry.decode(&"{36}e44b707300".parse().unwrap()).is_empty());
    assert_eq!(registry.stats("TFA-TwinPlus").unwrap().events, 0);
}

#[test]
fn twin_plus_checksum_nibble_must_match() {
    let tfa = TfaTwinPlus::new();
    // the checksum is the reflected top nibble of the last byte; 0 is correct
    for nibble in 1..16u8 {
        let bits = BitBuffer::from_rows([(&[0xe4, 0x4b, 0x70, 0x73, nibble << 4][..], 36)]);
        assert_eq!(tfa.decode(&bits), Err(DecodeError::FailMic), "{nibble:x}");
    }
}

#[test]
fn ws80_any_payload_bit_flip_fails_integrity() {
    let frame = hex::decode("aaaaaa2dd4800a003b0000888a5938186d1c00ffffd8df").unwrap();
    let ws80 = FineOffsetWs80::new();
    assert!(ws80.decode(&BitBuffer::from_rows([(&frame[..], 184)])).is_ok());

    // payload starts after the 40 bit preamble and sync word
    for bit in 40..184 {
        let mut corrupt = frame.clone();
        corrupt[bit / 8] ^= 0x80 >> (bit % 8);
        let bits = BitBuffer::from_rows([(&corrupt[..], 184)]);
        assert_eq!(ws80.decode(&bits), Err(DecodeError::FailMic), "bit {bit}");
    }
}

#[test]
fn bresser_rejects_implausible_channel_despite_checksum() {
    let rows = "{40}a5f9a6d219/{40}a5f9a6d219/{40}a5f9a6d219";
    assert_eq!(
        Bresser3ch::new().decode(&rows.parse().unwrap()),
        Err(DecodeError::FailSanity)
    );
}

#[test]
fn bresser_rejects_long_repeated_rows() {
    let rows = "{48}a5e9a6d20900/{48}a5e9a6d20900/{48}a5e9a6d20900";
    assert_eq!(
        Bresser3ch::new().decode(&rows.parse().unwrap()),
        Err(DecodeError::AbortLength)
    );
}
