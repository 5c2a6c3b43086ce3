// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature sensing and control abilities.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::ability::Ability;
use crate::error::{Error, Result};
use crate::object::{DeviceConnected, Value};
use crate::types::{FloatKind, NativeValue};

type SetTemperatureCallback = Arc<dyn Fn(f64) -> Result<()> + Send + Sync>;

/// Read-only temperature sensing.
///
/// Configuring adds a float `temperature` value and nothing else; the
/// sensor pushes readings through [`TemperatureSensor::set_temperature`].
pub struct TemperatureSensor {
    temperature_value: RwLock<Option<Arc<Value>>>,
}

impl TemperatureSensor {
    /// Creates a temperature sensor ability.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            temperature_value: RwLock::new(None),
        })
    }

    /// Pushes a temperature reading onto the bus.
    ///
    /// # Errors
    ///
    /// Returns an error if the ability is not yet configured or the value
    /// fails to publish.
    pub fn set_temperature(&self, temperature: f64) -> Result<()> {
        let value = self
            .temperature_value
            .read()
            .clone()
            .ok_or(Error::NotConfigured("temperaturesensor"))?;
        value.set(temperature)
    }
}

impl Ability for TemperatureSensor {
    fn names(&self) -> Vec<String> {
        vec!["temperaturesensor".to_string()]
    }

    fn configure(self: Arc<Self>, device: &DeviceConnected) -> Result<()> {
        let temperature_value =
            device.add_value("temperature", "Temperature", "Temperature", FloatKind)?;
        *self.temperature_value.write() = Some(temperature_value);
        Ok(())
    }
}

impl std::fmt::Debug for TemperatureSensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemperatureSensor")
            .field("configured", &self.temperature_value.read().is_some())
            .finish_non_exhaustive()
    }
}

/// Temperature control on top of [`TemperatureSensor`].
///
/// Configuring first configures the inner sensor, then adds a `set` command
/// taking a float parameter. The parameter keeps its historic wire id
/// `percent`; consumers address it by that id. A successful set echoes the
/// new setpoint through the temperature value.
pub struct Thermostat {
    sensor: Arc<TemperatureSensor>,
    set_callback: SetTemperatureCallback,
}

impl Thermostat {
    /// Creates a thermostat ability with the callback driving the real
    /// device.
    #[must_use]
    pub fn new(set_callback: impl Fn(f64) -> Result<()> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            sensor: TemperatureSensor::new(),
            set_callback: Arc::new(set_callback),
        })
    }

    /// Sets the target temperature: runs the callback, then echoes the
    /// setpoint through the temperature value.
    ///
    /// # Errors
    ///
    /// Returns the callback's error, or an error if the ability is not yet
    /// configured or the value fails to publish.
    pub fn set(&self, temperature: f64) -> Result<()> {
        (self.set_callback)(temperature)?;
        self.set_temperature(temperature)
    }

    /// Pushes a temperature reading. Delegates to the inner
    /// [`TemperatureSensor`].
    ///
    /// # Errors
    ///
    /// Same contract as [`TemperatureSensor::set_temperature`].
    pub fn set_temperature(&self, temperature: f64) -> Result<()> {
        self.sensor.set_temperature(temperature)
    }
}

impl Ability for Thermostat {
    fn names(&self) -> Vec<String> {
        vec!["temperaturesensor.thermostat".to_string()]
    }

    fn configure(self: Arc<Self>, device: &DeviceConnected) -> Result<()> {
        Arc::clone(&self.sensor).configure(device)?;

        let ability = Arc::clone(&self);
        let set = device.add_command("set", "Set", "Set temperature", move |arguments| {
            let temperature = arguments
                .first()
                .and_then(Option::as_ref)
                .and_then(NativeValue::as_f64)
                .ok_or(Error::MissingParameter("percent"))?;
            ability.set(temperature)
        })?;
        set.add_parameter("percent", "Percent", "Percent", FloatKind)?;
        Ok(())
    }
}

impl std::fmt::Debug for Thermostat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thermostat").finish_non_exhaustive()
    }
}
