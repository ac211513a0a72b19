use crate::catalog::Device;

/// Hardware volume, in percent.
pub trait VolumeControl: Send + Sync {
    fn volume(&self) -> u8;

    fn set_volume(&self, volume: u8);
}

pub trait BluetoothControl: Send + Sync {
    fn paired_devices(&self) -> Vec<Device>;

    /// Connect or disconnect the device, depending on its current state.
    fn toggle(&self, device: &Device);
}

pub trait AudioOutputControl: Send + Sync {
    fn output_devices(&self) -> Vec<Device>;

    fn select(&self, device: &Device);
}
