#![allow(missing_docs)]
//! Host-level tests for calibration validation, persistence, and the mode selector.

use sign_glow::Error;
use sign_glow::animation::{MODE_COUNT, Mode};
use sign_glow::calibration::{
    BASELINE_LEVEL_ADDRESS, Calibration, CalibrationField, FieldValue, MIC_OFFSET_ADDRESS,
    MODE_ADDRESS, ModeSelector, SCALING_FACTOR_ADDRESS,
};
use sign_glow::eeprom::{EEPROM_SIZE, Eeprom, RECORD_CAPACITY, RamEeprom};

#[test]
fn defaults_match_a_fresh_device() {
    let calibration = Calibration::default();
    assert_eq!(calibration.baseline_level(), 3.0);
    assert_eq!(calibration.scaling_factor(), 10.0);
    assert_eq!(calibration.mic_offset(), 0);
}

#[test]
fn rejected_baseline_keeps_previous_value() {
    let mut calibration = Calibration::default();
    assert_eq!(calibration.set_baseline_level(7.0), 7.0);
    assert_eq!(calibration.set_baseline_level(-5.0), 7.0);
    assert_eq!(calibration.set_baseline_level(0.0), 7.0);
    assert_eq!(calibration.set_baseline_level(f32::NAN), 7.0);
    assert_eq!(calibration.set_baseline_level(f32::INFINITY), 7.0);
    assert_eq!(calibration.baseline_level(), 7.0);
}

#[test]
fn scaling_factor_must_be_positive() {
    let mut calibration = Calibration::default();
    assert_eq!(calibration.set_scaling_factor(0.0), 10.0);
    assert_eq!(calibration.set_scaling_factor(2.5), 2.5);
}

#[test]
fn mic_offset_range_is_half_open() {
    let mut calibration = Calibration::default();
    assert_eq!(calibration.set_mic_offset(1023), 1023);
    assert_eq!(calibration.set_mic_offset(1024), 1023);
    assert_eq!(calibration.set_mic_offset(-1), 1023);
    assert_eq!(calibration.set_mic_offset(0), 0);
}

#[test]
fn set_reports_acceptance() {
    let mut calibration = Calibration::default();
    let setting = calibration.set(CalibrationField::MicOffset, 12.9);
    assert!(setting.accepted);
    assert_eq!(setting.value, FieldValue::Integer(12));

    let setting = calibration.set(CalibrationField::BaselineLevel, 0.0);
    assert!(!setting.accepted);
    assert_eq!(setting.value, FieldValue::Float(3.0));
}

#[test]
fn erased_storage_loads_defaults() -> Result<(), Error> {
    let mut eeprom = RamEeprom::new();
    assert_eq!(Calibration::load(&mut eeprom)?, Calibration::default());
    assert_eq!(ModeSelector::load(&mut eeprom)?.mode(), Mode::LettersStatic);
    Ok(())
}

#[test]
fn fields_persist_at_fixed_addresses() -> Result<(), Error> {
    let mut eeprom = RamEeprom::new();
    let mut calibration = Calibration::default();
    calibration.set_baseline_level(4.5);
    calibration.set_scaling_factor(12.0);
    calibration.set_mic_offset(42);
    for field in CalibrationField::ALL {
        calibration.persist(field, &mut eeprom)?;
    }

    let bytes = eeprom.as_bytes();
    assert_eq!(bytes[BASELINE_LEVEL_ADDRESS..][..4], 4.5f32.to_le_bytes());
    assert_eq!(bytes[SCALING_FACTOR_ADDRESS..][..4], 12.0f32.to_le_bytes());
    assert_eq!(bytes[MIC_OFFSET_ADDRESS..][..4], 42i32.to_le_bytes());
    assert_eq!(bytes[MODE_ADDRESS], 0xFF);

    assert_eq!(Calibration::load(&mut eeprom)?, calibration);
    Ok(())
}

#[test]
fn invalid_stored_values_fall_back_per_field() -> Result<(), Error> {
    let mut eeprom = RamEeprom::new();
    eeprom.write(BASELINE_LEVEL_ADDRESS, &(-1.0f32).to_le_bytes())?;
    eeprom.write(SCALING_FACTOR_ADDRESS, &20.0f32.to_le_bytes())?;
    eeprom.write(MIC_OFFSET_ADDRESS, &5_000i32.to_le_bytes())?;

    let calibration = Calibration::load(&mut eeprom)?;
    assert_eq!(calibration.baseline_level(), 3.0);
    assert_eq!(calibration.scaling_factor(), 20.0);
    assert_eq!(calibration.mic_offset(), 0);
    Ok(())
}

#[test]
fn mode_selector_wraps_and_persists() -> Result<(), Error> {
    let mut eeprom = RamEeprom::new();
    let mut selector = ModeSelector::load(&mut eeprom)?;
    for _ in 0..MODE_COUNT - 1 {
        selector.advance(&mut eeprom)?;
    }
    assert_eq!(selector.mode(), Mode::YellowToWhite);
    assert_eq!(ModeSelector::load(&mut eeprom)?.mode(), Mode::YellowToWhite);

    assert_eq!(selector.advance(&mut eeprom)?, Mode::LettersStatic);
    assert_eq!(eeprom.as_bytes()[MODE_ADDRESS], 0);
    Ok(())
}

#[test]
fn out_of_range_stored_mode_selects_first_mode() -> Result<(), Error> {
    let mut eeprom = RamEeprom::new();
    eeprom.write(MODE_ADDRESS, &[12])?;
    assert_eq!(ModeSelector::load(&mut eeprom)?.mode(), Mode::LettersStatic);
    eeprom.write(MODE_ADDRESS, &[4])?;
    assert_eq!(ModeSelector::load(&mut eeprom)?.mode(), Mode::VerticalRainbow);
    Ok(())
}

#[test]
fn update_skips_unchanged_bytes() -> Result<(), Error> {
    let mut eeprom = RamEeprom::new();
    assert!(eeprom.update(MODE_ADDRESS, &[3])?);
    assert!(!eeprom.update(MODE_ADDRESS, &[3])?);
    assert_eq!(eeprom.write_count(), 1);
    Ok(())
}

#[test]
fn storage_rejects_out_of_range_access() {
    let mut eeprom = RamEeprom::new();
    assert!(matches!(
        eeprom.write(EEPROM_SIZE - 1, &[0, 0]),
        Err(Error::IndexOutOfBounds)
    ));
    let mut buffer = [0u8; 4];
    assert!(matches!(
        eeprom.read(usize::MAX, &mut buffer),
        Err(Error::IndexOutOfBounds)
    ));
}

#[test]
fn flash_record_survives_a_round_trip() -> Result<(), Error> {
    let mut eeprom = RamEeprom::new();
    let mut calibration = Calibration::default();
    calibration.set_scaling_factor(6.0);
    calibration.persist(CalibrationField::ScalingFactor, &mut eeprom)?;

    let mut record = [0xFF; RECORD_CAPACITY];
    let used = eeprom.encode_record(&mut record)?;
    assert!(used <= RECORD_CAPACITY);

    let mut restored = RamEeprom::decode_record(&record)?.expect("record present");
    assert_eq!(Calibration::load(&mut restored)?.scaling_factor(), 6.0);
    Ok(())
}

#[test]
fn erased_flash_holds_no_record() -> Result<(), Error> {
    assert_eq!(RamEeprom::decode_record(&[0xFF; RECORD_CAPACITY])?, None);
    Ok(())
}

#[test]
fn damaged_record_is_reported() -> Result<(), Error> {
    let mut record = [0xFF; RECORD_CAPACITY];
    let used = RamEeprom::new().encode_record(&mut record)?;
    record[used - 5] ^= 0x01;
    assert!(matches!(
        RamEeprom::decode_record(&record),
        Err(Error::StorageCorrupted)
    ));
    Ok(())
}
