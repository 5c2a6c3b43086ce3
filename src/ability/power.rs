// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power control abilities.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::ability::Ability;
use crate::error::{Error, Result};
use crate::object::{DeviceConnected, Value};
use crate::types::{BooleanKind, IntegerKind, NativeValue};

type ActionCallback = Arc<dyn Fn() -> Result<()> + Send + Sync>;
type SetPercentCallback = Arc<dyn Fn(i32) -> Result<()> + Send + Sync>;
type StepCallback = Arc<dyn Fn() -> Result<i32> + Send + Sync>;

/// On/off power control.
///
/// Configuring adds `on` and `off` commands plus a boolean `on` value. The
/// ability drives the supplied callbacks and then republishes the value, so
/// the bus always reflects the state the callbacks produced.
pub struct Power {
    on_callback: ActionCallback,
    off_callback: ActionCallback,
    on_value: RwLock<Option<Arc<Value>>>,
}

impl Power {
    /// Creates a power ability with the callbacks driving the real device.
    #[must_use]
    pub fn new(
        on_callback: impl Fn() -> Result<()> + Send + Sync + 'static,
        off_callback: impl Fn() -> Result<()> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            on_callback: Arc::new(on_callback),
            off_callback: Arc::new(off_callback),
            on_value: RwLock::new(None),
        })
    }

    /// Turns the device on: runs the callback, then publishes `on = true`.
    ///
    /// # Errors
    ///
    /// Returns the callback's error, or an error if the ability is not yet
    /// configured or the value fails to publish. A failed callback publishes
    /// nothing.
    pub fn on(&self) -> Result<()> {
        (self.on_callback)()?;
        self.set_on(true)
    }

    /// Turns the device off: runs the callback, then publishes `on = false`.
    ///
    /// # Errors
    ///
    /// Same contract as [`Power::on`].
    pub fn off(&self) -> Result<()> {
        (self.off_callback)()?;
        self.set_on(false)
    }

    /// Pushes an externally-observed power state onto the bus.
    ///
    /// # Errors
    ///
    /// Returns an error if the ability is not yet configured or the value
    /// fails to publish.
    pub fn set_on(&self, on: bool) -> Result<()> {
        let value = self
            .on_value
            .read()
            .clone()
            .ok_or(Error::NotConfigured("power"))?;
        value.set(on)
    }
}

impl Ability for Power {
    fn names(&self) -> Vec<String> {
        vec!["power".to_string()]
    }

    fn configure(self: Arc<Self>, device: &DeviceConnected) -> Result<()> {
        let ability = Arc::clone(&self);
        device.add_command("on", "On", "Turn on", move |_| ability.on())?;
        let ability = Arc::clone(&self);
        device.add_command("off", "Off", "Turn off", move |_| ability.off())?;
        let on_value = device.add_value("on", "On", "Whether the device is on", BooleanKind)?;
        *self.on_value.write() = Some(on_value);
        Ok(())
    }
}

impl std::fmt::Debug for Power {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Power")
            .field("configured", &self.on_value.read().is_some())
            .finish_non_exhaustive()
    }
}

/// Variable power control on top of [`Power`].
///
/// Configuring first configures the inner power ability, then adds a `set`
/// command taking an integer `percent` parameter, parameterless `increase`
/// and `decrease` commands, and an integer `percent` value. The step
/// callbacks return the level they produced, which is republished.
pub struct PowerVariable {
    power: Arc<Power>,
    set_callback: SetPercentCallback,
    increase_callback: StepCallback,
    decrease_callback: StepCallback,
    percent_value: RwLock<Option<Arc<Value>>>,
}

impl PowerVariable {
    /// Creates a variable power ability.
    #[must_use]
    pub fn new(
        on_callback: impl Fn() -> Result<()> + Send + Sync + 'static,
        off_callback: impl Fn() -> Result<()> + Send + Sync + 'static,
        set_callback: impl Fn(i32) -> Result<()> + Send + Sync + 'static,
        increase_callback: impl Fn() -> Result<i32> + Send + Sync + 'static,
        decrease_callback: impl Fn() -> Result<i32> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            power: Power::new(on_callback, off_callback),
            set_callback: Arc::new(set_callback),
            increase_callback: Arc::new(increase_callback),
            decrease_callback: Arc::new(decrease_callback),
            percent_value: RwLock::new(None),
        })
    }

    /// Turns the device on. Delegates to the inner [`Power`].
    ///
    /// # Errors
    ///
    /// Same contract as [`Power::on`].
    pub fn on(&self) -> Result<()> {
        self.power.on()
    }

    /// Turns the device off. Delegates to the inner [`Power`].
    ///
    /// # Errors
    ///
    /// Same contract as [`Power::off`].
    pub fn off(&self) -> Result<()> {
        self.power.off()
    }

    /// Pushes an externally-observed power state. Delegates to the inner
    /// [`Power`].
    ///
    /// # Errors
    ///
    /// Same contract as [`Power::set_on`].
    pub fn set_on(&self, on: bool) -> Result<()> {
        self.power.set_on(on)
    }

    /// Sets the power level: runs the callback, then publishes the percent.
    ///
    /// # Errors
    ///
    /// Returns the callback's error, or an error if the ability is not yet
    /// configured or the value fails to publish.
    pub fn set(&self, percent: i32) -> Result<()> {
        (self.set_callback)(percent)?;
        self.set_percent(percent)
    }

    /// Increases the power level and publishes the level the callback
    /// reports.
    ///
    /// # Errors
    ///
    /// Same contract as [`PowerVariable::set`].
    pub fn increase(&self) -> Result<()> {
        let percent = (self.increase_callback)()?;
        self.set_percent(percent)
    }

    /// Decreases the power level and publishes the level the callback
    /// reports.
    ///
    /// # Errors
    ///
    /// Same contract as [`PowerVariable::set`].
    pub fn decrease(&self) -> Result<()> {
        let percent = (self.decrease_callback)()?;
        self.set_percent(percent)
    }

    /// Pushes an externally-observed power level onto the bus.
    ///
    /// # Errors
    ///
    /// Returns an error if the ability is not yet configured or the value
    /// fails to publish.
    pub fn set_percent(&self, percent: i32) -> Result<()> {
        let value = self
            .percent_value
            .read()
            .clone()
            .ok_or(Error::NotConfigured("power.variable"))?;
        value.set(percent)
    }
}

impl Ability for PowerVariable {
    fn names(&self) -> Vec<String> {
        vec!["power.variable".to_string()]
    }

    fn configure(self: Arc<Self>, device: &DeviceConnected) -> Result<()> {
        Arc::clone(&self.power).configure(device)?;

        let ability = Arc::clone(&self);
        let set = device.add_command("set", "Set", "Set power", move |arguments| {
            let percent = arguments
                .first()
                .and_then(Option::as_ref)
                .and_then(NativeValue::as_i32)
                .ok_or(Error::MissingParameter("percent"))?;
            ability.set(percent)
        })?;
        set.add_parameter("percent", "Percent", "Percent", IntegerKind)?;

        let ability = Arc::clone(&self);
        device.add_command("increase", "Increase", "Increase power", move |_| {
            ability.increase()
        })?;
        let ability = Arc::clone(&self);
        device.add_command("decrease", "Decrease", "Decrease power", move |_| {
            ability.decrease()
        })?;

        let percent_value = device.add_value("percent", "Percent", "Percent", IntegerKind)?;
        *self.percent_value.write() = Some(percent_value);
        Ok(())
    }
}

impl std::fmt::Debug for PowerVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PowerVariable")
            .field("configured", &self.percent_value.read().is_some())
            .finish_non_exhaustive()
    }
}
