//! Raw register maps, one module per SoC.

cfg_if::cfg_if! {
    if #[cfg(feature = "stm32f4")] {
        pub mod stm32f4;
    }
}
