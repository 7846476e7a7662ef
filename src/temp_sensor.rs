use anyhow::{Result, bail};
use rppal::i2c::I2c;

use crate::config::BME280_ADDR;
use crate::peripherals::TemperatureSensor;

// BME280 Register addresses
const CHIP_ID: u8 = 0xD0;
const CALIB_T_START: u8 = 0x88;
const CTRL_HUM: u8 = 0xF2;
const STATUS: u8 = 0xF3;
const CTRL_MEAS: u8 = 0xF4;
const CONFIG: u8 = 0xF5;
const TEMP_MSB: u8 = 0xFA;

const BME280_CHIP_ID: u8 = 0x60;
/// Raw reading reported when the temperature channel is skipped.
const ADC_SKIPPED: i32 = 0x80000;

/// Factory trimming values for the temperature channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureCalibration {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
}

/// Datasheet integer compensation. Returns hundredths of a degree Celsius.
pub fn compensate_temperature(adc_t: i32, calib: &TemperatureCalibration) -> i32 {
    let adc_t = i64::from(adc_t);
    let t1 = i64::from(calib.dig_t1);
    let t2 = i64::from(calib.dig_t2);
    let t3 = i64::from(calib.dig_t3);

    let var1 = (((adc_t >> 3) - (t1 << 1)) * t2) >> 11;
    let delta = (adc_t >> 4) - t1;
    let var2 = (((delta * delta) >> 12) * t3) >> 14;
    let t_fine = var1 + var2;

    ((t_fine * 5 + 128) >> 8) as i32
}

/// Ambient temperature from a Bosch BME280 on the Pi's I2C bus.
pub struct Bme280 {
    i2c: I2c,
    calib: TemperatureCalibration,
}

impl Bme280 {
    pub fn new() -> Result<Self> {
        Self::with_address(BME280_ADDR)
    }

    pub fn with_address(address: u16) -> Result<Self> {
        let mut i2c = I2c::new()?;
        i2c.set_slave_address(address)?;

        // Verify device ID (should be 0x60 for BME280)
        let chip_id = i2c.smbus_read_byte(CHIP_ID)?;
        if chip_id != BME280_CHIP_ID {
            bail!("Wrong device ID: 0x{chip_id:02X}, expected 0x{BME280_CHIP_ID:02X}");
        }

        let mut raw = [0u8; 6];
        for (i, item) in raw.iter_mut().enumerate() {
            *item = i2c.smbus_read_byte(CALIB_T_START + i as u8)?;
        }
        let calib = TemperatureCalibration {
            dig_t1: u16::from_le_bytes([raw[0], raw[1]]),
            dig_t2: i16::from_le_bytes([raw[2], raw[3]]),
            dig_t3: i16::from_le_bytes([raw[4], raw[5]]),
        };

        // CTRL_HUM: humidity x1, only latched by the following CTRL_MEAS write
        i2c.smbus_write_byte(CTRL_HUM, 0x01)?;

        // CONFIG: 1000 ms standby, filter off
        i2c.smbus_write_byte(CONFIG, 0xA0)?;

        // CTRL_MEAS: temperature x1, pressure x1, normal mode
        i2c.smbus_write_byte(CTRL_MEAS, 0x27)?;

        std::thread::sleep(std::time::Duration::from_millis(10));

        log::info!("✓ Temperature sensor (BME280) initialized at 0x{address:02X}");
        Ok(Self { i2c, calib })
    }

    fn read_adc(&mut self) -> Result<i32> {
        // Wait out a conversion in progress
        let status = self.i2c.smbus_read_byte(STATUS)?;
        if status & 0x08 != 0 {
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        let mut data = [0u8; 3];
        for (i, item) in data.iter_mut().enumerate() {
            *item = self.i2c.smbus_read_byte(TEMP_MSB + i as u8)?;
        }

        // 20-bit value: msb, lsb, upper nibble of xlsb
        Ok((i32::from(data[0]) << 12) | (i32::from(data[1]) << 4) | (i32::from(data[2]) >> 4))
    }
}

impl TemperatureSensor for Bme280 {
    fn read_celsius(&mut self) -> Result<f64> {
        let adc_t = self.read_adc()?;
        if adc_t == ADC_SKIPPED {
            bail!("BME280 temperature measurement skipped");
        }
        Ok(f64::from(compensate_temperature(adc_t, &self.calib)) / 100.0)
    }
}
