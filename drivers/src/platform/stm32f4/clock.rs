//! STM32F4 clock controller (RCC).

use super::PERIPHERAL_MAP;
use crate::clk::profile::{self, ClockProfile, HSE_HZ};
use crate::clk::{ClockBus, WaitPolicy, wait_until};
use crate::hal::clock::{ClockController, ClockDomain, ClockError, WaitStage};
use crate::hw::stm32f4::{flash, pwr, rcc};
use crate::mmio::RegisterBus;
use alloc::sync::Arc;
use log::{debug, info};

pub struct Stm32Clock {
    bus: Arc<dyn RegisterBus>,
    hse_hz: u32,
    wait: WaitPolicy,
}

impl Stm32Clock {
    pub fn new(bus: Arc<dyn RegisterBus>) -> Self {
        Self {
            bus,
            hse_hz: HSE_HZ,
            wait: WaitPolicy::default(),
        }
    }

    /// Use an `hz` external oscillator instead of the board default.
    pub fn with_hse(mut self, hz: u32) -> Self {
        self.hse_hz = hz;
        self
    }

    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    fn wait_for(&self, stage: WaitStage, addr: usize, mask: u32, value: u32) -> Result<(), ClockError> {
        wait_until(self.wait, stage, || self.bus.read32(addr) & mask == value)
    }

    fn core_hz(&self, cfgr: u32) -> u32 {
        if cfgr & rcc::CFGR_SWS_MASK != rcc::CFGR_SWS_PLL {
            return 0;
        }

        let pllcfgr = self.bus.read32(rcc::PLLCFGR);
        let m = pllcfgr & rcc::PLLCFGR_PLLM_MASK;
        let n = (pllcfgr & rcc::PLLCFGR_PLLN_MASK) >> rcc::PLLCFGR_PLLN_SHIFT;
        let p = (((pllcfgr & rcc::PLLCFGR_PLLP_MASK) >> rcc::PLLCFGR_PLLP_SHIFT) + 1) << 1;
        profile::pll_output_hz(self.hse_hz, m, n, p)
    }

    fn set_flash_latency(&self, wait_states: u32) {
        debug!("clk: flash latency {} wait states", wait_states);
        self.bus.write32(
            flash::ACR,
            (wait_states & flash::ACR_LATENCY_MASK)
                | flash::ACR_PRFTEN
                | flash::ACR_ICEN
                | flash::ACR_DCEN,
        );
    }
}

/// PLLCFGR fields for `profile`, without the source bit.
pub const fn pllcfgr_value(profile: &ClockProfile) -> u32 {
    profile.pll_m
        | (profile.pll_n << rcc::PLLCFGR_PLLN_SHIFT)
        | (((profile.pll_p >> 1) - 1) << rcc::PLLCFGR_PLLP_SHIFT)
        | (profile.pll_q << rcc::PLLCFGR_PLLQ_SHIFT)
}

/// CFGR prescaler fields for `profile`.
pub const fn cfgr_prescalers(profile: &ClockProfile) -> u32 {
    ((profile.ahb as u32) << rcc::CFGR_HPRE_SHIFT)
        | ((profile.apb1 as u32) << rcc::CFGR_PPRE1_SHIFT)
        | ((profile.apb2 as u32) << rcc::CFGR_PPRE2_SHIFT)
}

impl ClockController for Stm32Clock {
    fn rate(&self, domain: ClockDomain) -> u32 {
        let cfgr = self.bus.read32(rcc::CFGR);
        let core = self.core_hz(cfgr);

        match domain {
            ClockDomain::Core => core,
            ClockDomain::Ahb => {
                core >> profile::ahb_shift((cfgr & rcc::CFGR_HPRE_MASK) >> rcc::CFGR_HPRE_SHIFT)
            }
            ClockDomain::Apb1 => {
                core >> profile::apb_shift((cfgr & rcc::CFGR_PPRE1_MASK) >> rcc::CFGR_PPRE1_SHIFT)
            }
            ClockDomain::Apb2 => {
                core >> profile::apb_shift((cfgr & rcc::CFGR_PPRE2_MASK) >> rcc::CFGR_PPRE2_SHIFT)
            }
        }
    }

    fn enable_periph(&self, addr: u32) -> Result<(), ClockError> {
        let (bus, bit) = PERIPHERAL_MAP.classify(addr)?;
        let enr = match bus {
            ClockBus::Apb1 => rcc::APB1ENR,
            ClockBus::Apb2 => rcc::APB2ENR,
            ClockBus::Ahb1 => rcc::AHB1ENR,
            ClockBus::Ahb2 => rcc::AHB2ENR,
            ClockBus::Ahb3 => rcc::AHB3ENR,
        };
        self.bus.set_bits(enr, 1 << bit);
        Ok(())
    }

    fn update(&self, target_hz: u32) -> Result<(), ClockError> {
        let profile = ClockProfile::for_frequency(target_hz, self.hse_hz);
        if !profile.is_valid() {
            return Err(ClockError::InvalidProfile);
        }
        let sys_hz = profile.sysclk_hz(self.hse_hz);
        info!("clk: switching system clock to {} Hz (HSE {} Hz)", sys_hz, self.hse_hz);

        // Back to the reset configuration, running from HSI.
        self.bus.set_bits(rcc::CR, rcc::CR_HSION);
        self.bus.write32(rcc::CFGR, 0);
        self.bus
            .clear_bits(rcc::CR, rcc::CR_HSEON | rcc::CR_CSSON | rcc::CR_PLLON);
        self.bus.write32(rcc::PLLCFGR, rcc::PLLCFGR_RESET);
        self.bus.clear_bits(rcc::CR, rcc::CR_HSEBYP);
        self.bus.write32(rcc::CIR, 0);

        self.bus.set_bits(rcc::CR, rcc::CR_HSEON);
        self.wait_for(WaitStage::HseReady, rcc::CR, rcc::CR_HSERDY, rcc::CR_HSERDY)?;

        self.bus.set_bits(rcc::APB1ENR, rcc::APB1ENR_PWREN);
        self.bus.write32(pwr::CR, pwr::CR_VOS_SCALE1);

        self.bus.set_bits(rcc::CFGR, cfgr_prescalers(&profile));

        self.bus.write32(rcc::PLLCFGR, pllcfgr_value(&profile));
        self.bus.set_bits(rcc::PLLCFGR, rcc::PLLCFGR_PLLSRC_HSE);

        self.bus.set_bits(rcc::CR, rcc::CR_PLLON);
        self.wait_for(WaitStage::PllReady, rcc::CR, rcc::CR_PLLRDY, rcc::CR_PLLRDY)?;

        // Flash must be slowed down before the core speeds up.
        self.set_flash_latency(profile::flash_latency(sys_hz));

        self.bus.clear_bits(rcc::CFGR, rcc::CFGR_SW_MASK);
        self.bus.set_bits(rcc::CFGR, rcc::CFGR_SW_PLL);
        self.wait_for(
            WaitStage::SysclkSwitch,
            rcc::CFGR,
            rcc::CFGR_SWS_MASK,
            rcc::CFGR_SWS_PLL,
        )?;

        info!("clk: system clock {} Hz", self.rate(ClockDomain::Core));
        Ok(())
    }
}
