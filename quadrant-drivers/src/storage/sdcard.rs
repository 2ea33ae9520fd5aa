//! SD card in SPI mode
//!
//! Card bring-up follows the SPI-mode initialization handshake: force
//! SPI mode with CMD0 under 80 clocks of dummy traffic, probe the
//! voltage window with CMD8 (v2 cards answer, v1 cards reject), loop
//! ACMD41 until the card leaves idle, then read the OCR to learn
//! whether addressing is by byte (SDSC) or by block (SDHC/SDXC).
//!
//! The card is optional equipment: a failed mount degrades the device
//! to running without storage, so every error here is reported, never
//! escalated.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

/// SD command numbers
pub mod cmd {
    /// Reset to idle state
    pub const GO_IDLE_STATE: u8 = 0;
    /// Voltage window check, v2 cards only
    pub const SEND_IF_COND: u8 = 8;
    /// Read the card-specific data register
    pub const SEND_CSD: u8 = 9;
    /// Read a single block
    pub const READ_SINGLE_BLOCK: u8 = 17;
    /// Prefix for application commands
    pub const APP_CMD: u8 = 55;
    /// Read the operating conditions register
    pub const READ_OCR: u8 = 58;
    /// Activate initialization (application command)
    pub const APP_SEND_OP_COND: u8 = 41;
}

/// R1 idle-state flag
const R1_IDLE: u8 = 0x01;
/// CMD8 check pattern: 2.7-3.6V window plus echo byte
const IF_COND_ARG: u32 = 0x1AA;
/// OCR card-capacity-status bit (block addressing)
const OCR_CCS: u32 = 1 << 30;
/// ACMD41 host-capacity-support bit
const ACMD41_HCS: u32 = 1 << 30;
/// Block size in bytes
pub const BLOCK_LEN: usize = 512;

/// Addressing scheme reported by the card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CardType {
    /// Standard capacity, byte-addressed
    Sdsc,
    /// High/extended capacity, block-addressed
    SdhcSdxc,
}

/// SD errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SdError {
    /// SPI transfer failed
    Bus,
    /// No response to a command
    NoResponse,
    /// Card rejected a command or stayed idle past the deadline
    InitFailed,
    /// Data token never arrived
    ReadTimeout,
}

/// Decode user capacity in 512-byte blocks from a raw CSD register
///
/// Handles both CSD layouts: v2 (SDHC/SDXC) carries a 22-bit C_SIZE
/// in units of 512 KiB; v1 (SDSC) derives the size from C_SIZE,
/// C_SIZE_MULT and the read block length.
pub fn csd_capacity_blocks(csd: &[u8; 16]) -> Option<u32> {
    match csd[0] >> 6 {
        0 => {
            let read_bl_len = (csd[5] & 0x0F) as u32;
            let c_size = (((csd[6] & 0x03) as u32) << 10)
                | ((csd[7] as u32) << 2)
                | ((csd[8] >> 6) as u32);
            let c_size_mult = (((csd[9] & 0x03) as u32) << 1) | ((csd[10] >> 7) as u32);
            let bytes = (c_size + 1) as u64
                * (1u64 << (c_size_mult + 2))
                * (1u64 << read_bl_len);
            Some((bytes / BLOCK_LEN as u64) as u32)
        }
        1 => {
            let c_size = (((csd[7] & 0x3F) as u32) << 16)
                | ((csd[8] as u32) << 8)
                | (csd[9] as u32);
            Some((c_size + 1) * 1024)
        }
        _ => None,
    }
}

/// Compute the 7-bit CRC for a command frame
///
/// Polynomial x^7 + x^3 + 1; the returned byte already carries the
/// trailing stop bit the card expects.
pub fn crc7(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;
    for &byte in data {
        let mut b = byte;
        for _ in 0..8 {
            crc <<= 1;
            if (b & 0x80) ^ (crc & 0x80) != 0 {
                crc ^= 0x09;
            }
            crc &= 0x7F;
            b <<= 1;
        }
    }
    (crc << 1) | 1
}

/// SD card driver in SPI mode
pub struct SdCard<SPI, CS> {
    spi: SPI,
    cs: CS,
    card_type: CardType,
}

impl<SPI, CS> SdCard<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self {
            spi,
            cs,
            card_type: CardType::Sdsc,
        }
    }

    /// Addressing scheme learned during [`Self::init`]
    pub fn card_type(&self) -> CardType {
        self.card_type
    }

    fn select(&mut self) -> Result<(), SdError> {
        self.cs.set_low().map_err(|_| SdError::Bus)
    }

    fn deselect(&mut self) -> Result<(), SdError> {
        self.cs.set_high().map_err(|_| SdError::Bus)?;
        // One extra clock byte so the card releases the bus
        self.spi.write(&[0xFF]).map_err(|_| SdError::Bus)
    }

    fn xfer_byte(&mut self, out: u8) -> Result<u8, SdError> {
        let mut buf = [out];
        self.spi
            .transfer_in_place(&mut buf)
            .map_err(|_| SdError::Bus)?;
        Ok(buf[0])
    }

    /// Send a command frame and wait for the R1 response byte
    fn command(&mut self, command: u8, arg: u32) -> Result<u8, SdError> {
        let mut frame = [0u8; 6];
        frame[0] = 0x40 | command;
        frame[1..5].copy_from_slice(&arg.to_be_bytes());
        frame[5] = crc7(&frame[..5]);
        self.spi.write(&frame).map_err(|_| SdError::Bus)?;

        // R1 arrives within 8 bytes, flagged by a cleared MSB
        for _ in 0..8 {
            let r = self.xfer_byte(0xFF)?;
            if r & 0x80 == 0 {
                return Ok(r);
            }
        }
        Err(SdError::NoResponse)
    }

    fn app_command(&mut self, command: u8, arg: u32) -> Result<u8, SdError> {
        self.command(cmd::APP_CMD, 0)?;
        self.command(command, arg)
    }

    fn read_u32(&mut self) -> Result<u32, SdError> {
        let mut bytes = [0u8; 4];
        for b in &mut bytes {
            *b = self.xfer_byte(0xFF)?;
        }
        Ok(u32::from_be_bytes(bytes))
    }

    /// Run the SPI-mode initialization handshake
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), SdError> {
        // At least 74 clocks with CS high put the card in SPI mode
        self.cs.set_high().map_err(|_| SdError::Bus)?;
        self.spi.write(&[0xFF; 10]).map_err(|_| SdError::Bus)?;

        self.select()?;
        let result = self.init_selected(delay);
        self.deselect()?;
        result
    }

    fn init_selected(&mut self, delay: &mut impl DelayNs) -> Result<(), SdError> {
        if self.command(cmd::GO_IDLE_STATE, 0)? != R1_IDLE {
            return Err(SdError::InitFailed);
        }

        // v2 cards echo the check pattern; v1 cards flag an illegal
        // command and skip HCS during ACMD41
        let v2 = self.command(cmd::SEND_IF_COND, IF_COND_ARG)? == R1_IDLE;
        if v2 {
            let echo = self.read_u32()?;
            if echo & 0xFFF != IF_COND_ARG {
                return Err(SdError::InitFailed);
            }
        }

        let op_arg = if v2 { ACMD41_HCS } else { 0 };
        let mut ready = false;
        for _ in 0..1000 {
            if self.app_command(cmd::APP_SEND_OP_COND, op_arg)? == 0 {
                ready = true;
                break;
            }
            delay.delay_ms(1);
        }
        if !ready {
            return Err(SdError::InitFailed);
        }

        self.card_type = if v2 {
            if self.command(cmd::READ_OCR, 0)? != 0 {
                return Err(SdError::InitFailed);
            }
            let ocr = self.read_u32()?;
            if ocr & OCR_CCS != 0 {
                CardType::SdhcSdxc
            } else {
                CardType::Sdsc
            }
        } else {
            CardType::Sdsc
        };
        Ok(())
    }

    /// Read the CSD register and report the card capacity in blocks
    pub fn capacity_blocks(&mut self) -> Result<u32, SdError> {
        self.select()?;
        let result = self.read_csd_selected();
        self.deselect()?;
        let csd = result?;
        csd_capacity_blocks(&csd).ok_or(SdError::InitFailed)
    }

    fn read_csd_selected(&mut self) -> Result<[u8; 16], SdError> {
        if self.command(cmd::SEND_CSD, 0)? != 0 {
            return Err(SdError::ReadTimeout);
        }
        self.wait_data_token()?;
        let mut csd = [0u8; 16];
        for b in &mut csd {
            *b = self.xfer_byte(0xFF)?;
        }
        // Discard the 16-bit data CRC
        self.xfer_byte(0xFF)?;
        self.xfer_byte(0xFF)?;
        Ok(csd)
    }

    /// Wait for the 0xFE token that precedes a data block
    fn wait_data_token(&mut self) -> Result<(), SdError> {
        for _ in 0..10_000 {
            if self.xfer_byte(0xFF)? == 0xFE {
                return Ok(());
            }
        }
        Err(SdError::ReadTimeout)
    }

    /// Read one 512-byte block
    ///
    /// `block` is a block index regardless of card type; byte-addressed
    /// cards get the index scaled internally.
    pub fn read_block(&mut self, block: u32, buf: &mut [u8; BLOCK_LEN]) -> Result<(), SdError> {
        let addr = match self.card_type {
            CardType::SdhcSdxc => block,
            CardType::Sdsc => block * BLOCK_LEN as u32,
        };

        self.select()?;
        let result = self.read_block_selected(addr, buf);
        self.deselect()?;
        result
    }

    fn read_block_selected(
        &mut self,
        addr: u32,
        buf: &mut [u8; BLOCK_LEN],
    ) -> Result<(), SdError> {
        if self.command(cmd::READ_SINGLE_BLOCK, addr)? != 0 {
            return Err(SdError::ReadTimeout);
        }
        self.wait_data_token()?;

        for b in buf.iter_mut() {
            *b = self.xfer_byte(0xFF)?;
        }
        // Discard the 16-bit data CRC
        self.xfer_byte(0xFF)?;
        self.xfer_byte(0xFF)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc7_cmd0() {
        // CMD0 with zero argument has the well-known CRC byte 0x95
        let frame = [0x40, 0, 0, 0, 0];
        assert_eq!(crc7(&frame), 0x95);
    }

    #[test]
    fn test_crc7_cmd8() {
        // CMD8 with the 0x1AA check pattern has CRC byte 0x87
        let frame = [0x48, 0x00, 0x00, 0x01, 0xAA];
        assert_eq!(crc7(&frame), 0x87);
    }

    #[test]
    fn test_csd_v2_capacity() {
        // C_SIZE = 0x3B37 -> (0x3B37 + 1) * 1024 blocks (~7.4 GB card)
        let mut csd = [0u8; 16];
        csd[0] = 0x40;
        csd[8] = 0x3B;
        csd[9] = 0x37;
        assert_eq!(csd_capacity_blocks(&csd), Some((0x3B37 + 1) * 1024));
    }

    #[test]
    fn test_csd_v1_capacity() {
        // READ_BL_LEN = 9, C_SIZE = 4095, C_SIZE_MULT = 7 -> 1 GiB
        let mut csd = [0u8; 16];
        csd[5] = 0x09;
        csd[6] = 0x03;
        csd[7] = 0xFF;
        csd[8] = 0xC0;
        csd[9] = 0x03;
        csd[10] = 0x80;
        assert_eq!(csd_capacity_blocks(&csd), Some(2_097_152));
    }

    #[test]
    fn test_csd_unknown_version() {
        let mut csd = [0u8; 16];
        csd[0] = 0x80;
        assert_eq!(csd_capacity_blocks(&csd), None);
    }
}
