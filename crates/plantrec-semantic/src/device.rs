use candle_core::Device;
use tracing::info;

/// Prefer an accelerator when the matching feature is compiled in,
/// otherwise run on CPU. Embedding this catalog is small enough that CPU
/// is a perfectly workable default.
pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        if let Ok(dev) = Device::new_metal(0) {
            info!("embedding device: metal");
            return dev;
        }
    }
    #[cfg(feature = "cuda")]
    {
        if let Ok(dev) = Device::new_cuda(0) {
            info!("embedding device: cuda");
            return dev;
        }
    }
    info!("embedding device: cpu");
    Device::Cpu
}
