//! PLL and bus prescaler profiles.
//!
//! The system frequency is fixed at build time by a `sysclk-*` feature; the
//! matching profile is checked at compile time.

use static_assertions::const_assert;

/// External oscillator frequency fitted on the board.
pub const HSE_HZ: u32 = 8_000_000;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "sysclk-84mhz", feature = "sysclk-180mhz"))] {
        compile_error!("Multiple system clocks selected! Choose one: sysclk-84mhz OR sysclk-180mhz");
    } else if #[cfg(feature = "sysclk-84mhz")] {
        pub const SYS_CLK_FREQ: u32 = 84_000_000;
    } else if #[cfg(feature = "sysclk-180mhz")] {
        pub const SYS_CLK_FREQ: u32 = 180_000_000;
    } else {
        pub const SYS_CLK_FREQ: u32 = 168_000_000;
    }
}

/// AHB prescaler, encoded as the RCC `HPRE` field.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AhbPrescaler {
    Div1 = 0x0,
    Div2 = 0x8,
    Div4 = 0x9,
    Div8 = 0xa,
    Div16 = 0xb,
    Div64 = 0xc,
    Div128 = 0xd,
    Div256 = 0xe,
    Div512 = 0xf,
}

/// APB prescaler, encoded as the RCC `PPREx` field.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ApbPrescaler {
    Div1 = 0x0,
    Div2 = 0x4,
    Div4 = 0x5,
    Div8 = 0x6,
    Div16 = 0x7,
}

const AHB_SHIFT: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 6, 7, 8, 9];
const APB_SHIFT: [u8; 8] = [0, 0, 0, 0, 1, 2, 3, 4];

/// Right shift applied to the core clock by an `HPRE` field value.
pub const fn ahb_shift(field: u32) -> u32 {
    AHB_SHIFT[(field & 0xf) as usize] as u32
}

/// Right shift applied to the core clock by a `PPREx` field value.
pub const fn apb_shift(field: u32) -> u32 {
    APB_SHIFT[(field & 0x7) as usize] as u32
}

/// PLL output of `hse_hz` through `/m * n / p`, 0 if a divider is zero.
pub const fn pll_output_hz(hse_hz: u32, m: u32, n: u32, p: u32) -> u32 {
    if m == 0 || p == 0 {
        return 0;
    }
    ((hse_hz / m) as u64 * n as u64 / p as u64) as u32
}

/// Flash wait states needed at `sys_hz` (one per 30 MHz).
pub const fn flash_latency(sys_hz: u32) -> u32 {
    sys_hz.saturating_sub(1) / 30_000_000
}

/// PLL and prescaler settings for one system frequency.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ClockProfile {
    pub pll_m: u32,
    pub pll_n: u32,
    pub pll_p: u32,
    pub pll_q: u32,
    pub ahb: AhbPrescaler,
    pub apb1: ApbPrescaler,
    pub apb2: ApbPrescaler,
}

impl ClockProfile {
    /// Profile for `sys_hz` from an `hse_hz` reference. Frequencies without
    /// a dedicated profile get the 168 MHz one.
    pub const fn for_frequency(sys_hz: u32, hse_hz: u32) -> Self {
        let pll_m = hse_hz / 1_000_000;
        match sys_hz {
            84_000_000 => Self {
                pll_m,
                pll_n: 336,
                pll_p: 4,
                pll_q: 7,
                ahb: AhbPrescaler::Div1,
                apb1: ApbPrescaler::Div2,
                apb2: ApbPrescaler::Div1,
            },
            180_000_000 => Self {
                pll_m,
                pll_n: 360,
                pll_p: 2,
                pll_q: 7,
                ahb: AhbPrescaler::Div1,
                apb1: ApbPrescaler::Div4,
                apb2: ApbPrescaler::Div2,
            },
            _ => Self {
                pll_m,
                pll_n: 336,
                pll_p: 2,
                pll_q: 7,
                ahb: AhbPrescaler::Div1,
                apb1: ApbPrescaler::Div4,
                apb2: ApbPrescaler::Div2,
            },
        }
    }

    /// Every PLL field within the range the hardware accepts.
    pub const fn is_valid(&self) -> bool {
        let p_ok = matches!(self.pll_p, 2 | 4 | 6 | 8);
        self.pll_m >= 2
            && self.pll_m <= 63
            && self.pll_n >= 50
            && self.pll_n <= 432
            && p_ok
            && self.pll_q >= 2
            && self.pll_q <= 15
    }

    /// System clock this profile produces from `hse_hz`.
    pub const fn sysclk_hz(&self, hse_hz: u32) -> u32 {
        pll_output_hz(hse_hz, self.pll_m, self.pll_n, self.pll_p)
    }
}

/// Profile for the configured system frequency.
pub const SYS_PROFILE: ClockProfile = ClockProfile::for_frequency(SYS_CLK_FREQ, HSE_HZ);

const_assert!(SYS_PROFILE.is_valid());
const_assert!(SYS_PROFILE.sysclk_hz(HSE_HZ) == SYS_CLK_FREQ);
