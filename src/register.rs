//! ILI9225 register map and the power-on programming sequence.
//!
//! Values come from the ILI9225 application notes. The sequence is split in
//! three parts because the driver output and entry mode registers depend on
//! whether the panel is used transposed (90°/270°) or not.

use crate::Rotation;

/// Registers written by this driver. The discriminant is the register index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Register {
    /// Driver Output Control (01h) - SM/GS/SS and number of lines
    DriverOutputControl = 0x01,
    /// LCD AC Driving Control (02h) - line inversion
    LcdAcDrivingControl = 0x02,
    /// Entry Mode (03h) - BGR, GRAM increment direction and AM
    EntryMode = 0x03,
    /// Display Control 1 (07h) - gate output and display on/off
    DisplayControl1 = 0x07,
    /// Blank Period Control 1 (08h) - back and front porch
    BlankPeriodControl1 = 0x08,
    /// Frame Cycle Control (0Bh) - clocks per line
    FrameCycleControl = 0x0B,
    /// Interface Control (0Ch) - RGB/CPU interface selection
    InterfaceControl = 0x0C,
    /// Oscillation Control (0Fh) - oscillator frequency and enable
    OscillationControl = 0x0F,

    /// Power Control 1 (10h) - SAP, DSTB, STB
    PowerControl1 = 0x10,
    /// Power Control 2 (11h) - APON, PON, AON, VCI1EN, VC
    PowerControl2 = 0x11,
    /// Power Control 3 (12h) - BT, DC1, DC2, DC3
    PowerControl3 = 0x12,
    /// Power Control 4 (13h) - GVDD
    PowerControl4 = 0x13,
    /// Power Control 5 (14h) - VCOMH/VCOML
    PowerControl5 = 0x14,
    /// VCI Recycling (15h)
    VciRecycling = 0x15,

    /// RAM Address Set 1 (20h) - horizontal GRAM address
    RamAddressSet1 = 0x20,
    /// RAM Address Set 2 (21h) - vertical GRAM address
    RamAddressSet2 = 0x21,
    /// Write Data to GRAM (22h) - starts the pixel data phase
    GramData = 0x22,

    /// Gate Scan Control (30h)
    GateScanControl = 0x30,
    /// Vertical Scroll Control 1 (31h) - scroll end
    VerticalScrollControl1 = 0x31,
    /// Vertical Scroll Control 2 (32h) - scroll start
    VerticalScrollControl2 = 0x32,
    /// Vertical Scroll Control 3 (33h) - scroll step
    VerticalScrollControl3 = 0x33,
    /// Partial Driving Position 1 (34h) - partial end
    PartialDrivingPosition1 = 0x34,
    /// Partial Driving Position 2 (35h) - partial start
    PartialDrivingPosition2 = 0x35,
    /// Horizontal Window Address 1 (36h) - horizontal end
    HorizontalWindowEnd = 0x36,
    /// Horizontal Window Address 2 (37h) - horizontal start
    HorizontalWindowStart = 0x37,
    /// Vertical Window Address 1 (38h) - vertical end
    VerticalWindowEnd = 0x38,
    /// Vertical Window Address 2 (39h) - vertical start
    VerticalWindowStart = 0x39,

    GammaControl1 = 0x50,
    GammaControl2 = 0x51,
    GammaControl3 = 0x52,
    GammaControl4 = 0x53,
    GammaControl5 = 0x54,
    GammaControl6 = 0x55,
    GammaControl7 = 0x56,
    GammaControl8 = 0x57,
    GammaControl9 = 0x58,
    GammaControl10 = 0x59,
}

impl Register {
    /// Register index as sent on the bus.
    pub const fn index(self) -> u16 {
        self as u16
    }
}

/// One entry of a register programming sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Write(Register, u16),
    DelayMs(u64),
}

use Register::*;
use Step::{DelayMs, Write};

/// `DisplayControl1` value with gate output and display enabled.
pub const DISPLAY_ON: u16 = 0x1017;
/// `DisplayControl1` value with the display disabled.
pub const DISPLAY_OFF: u16 = 0x0000;

/// Power supply bring-up, ending with line inversion.
pub const POWER_ON_SEQUENCE: &[Step] = &[
    Write(PowerControl1, 0x0000),
    Write(PowerControl2, 0x0000),
    Write(PowerControl3, 0x0000),
    Write(PowerControl4, 0x0000),
    Write(PowerControl5, 0x0000),
    DelayMs(20),
    Write(PowerControl2, 0x0018),
    Write(PowerControl3, 0x1121),
    Write(PowerControl4, 0x0063),
    Write(PowerControl5, 0x3961),
    Write(PowerControl1, 0x0800),
    DelayMs(10),
    Write(PowerControl2, 0x1038),
    DelayMs(30),
    Write(LcdAcDrivingControl, 0x0100),
];

/// Driver output and GRAM entry mode for the given rotation.
///
/// Transposed: SM=0, GS=0, SS=0 and BGR=1, ID=11, AM=1.
/// Otherwise: SM=0, GS=0, SS=1 and BGR=1, ID=11, AM=0.
pub const fn scan_direction(rotation: Rotation) -> [Step; 2] {
    if rotation.is_transposed() {
        [Write(DriverOutputControl, 0x001C), Write(EntryMode, 0x1038)]
    } else {
        [Write(DriverOutputControl, 0x011C), Write(EntryMode, 0x1030)]
    }
}

/// Timing, GRAM area and gamma 2.2 setup, ending with the display on.
pub const PANEL_SETUP_SEQUENCE: &[Step] = &[
    Write(DisplayControl1, DISPLAY_OFF),
    Write(BlankPeriodControl1, 0x0808),
    Write(FrameCycleControl, 0x1100),
    Write(InterfaceControl, 0x0000),
    Write(OscillationControl, 0x0501),
    Write(VciRecycling, 0x0020),
    Write(RamAddressSet1, 0x0000),
    Write(RamAddressSet2, 0x0000),
    // GRAM area
    Write(GateScanControl, 0x0000),
    Write(VerticalScrollControl1, 0x00DB),
    Write(VerticalScrollControl2, 0x0000),
    Write(VerticalScrollControl3, 0x0000),
    Write(PartialDrivingPosition1, 0x00DB),
    Write(PartialDrivingPosition2, 0x0000),
    Write(HorizontalWindowEnd, 0x00AF),
    Write(HorizontalWindowStart, 0x0000),
    Write(VerticalWindowEnd, 0x00DB),
    Write(VerticalWindowStart, 0x0000),
    // Gamma 2.2
    Write(GammaControl1, 0x0603),
    Write(GammaControl2, 0x080D),
    Write(GammaControl3, 0x0D0C),
    Write(GammaControl4, 0x0205),
    Write(GammaControl5, 0x040A),
    Write(GammaControl6, 0x0703),
    Write(GammaControl7, 0x0300),
    Write(GammaControl8, 0x0400),
    Write(GammaControl9, 0x0B00),
    Write(GammaControl10, 0x0017),
    Write(OscillationControl, 0x0701),
    Write(DisplayControl1, 0x0012),
    DelayMs(50),
    Write(DisplayControl1, DISPLAY_ON),
];
