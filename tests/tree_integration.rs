// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end tests over the in-memory transport.
//!
//! These cover the full flow: building a tree publishes every descriptor in
//! order, inbound perform requests route through the gateway into ability
//! callbacks, and failures stay contained at the dispatch boundary.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};

use hearthbus::ability::{Ability, Power, PowerVariable, TemperatureSensor, Thermostat};
use hearthbus::object::{BusObject, Node};
use hearthbus::protocol::{Gateway, InboundMessage, MemoryTransport};
use hearthbus::{Error, Result};
use serde_json::json;

fn gateway() -> (Gateway, Arc<MemoryTransport>) {
    let transport = Arc::new(MemoryTransport::new());
    let gateway = Gateway::new(transport.clone());
    (gateway, transport)
}

// ============================================================================
// Tree Publication Tests
// ============================================================================

mod tree_publication {
    use super::*;

    #[test]
    fn descriptors_publish_top_down_in_construction_order() {
        let (gateway, transport) = gateway();

        let node = Node::new(&gateway, "home", "Home", "Node for the house").unwrap();
        let hardware = node.add_hardware("relays", "Relays", "Relay board").unwrap();
        let power = Power::new(|| Ok(()), || Ok(()));
        hardware
            .add_device_connected(
                "lamp",
                "Lamp",
                "Bedside lamp",
                vec![power as Arc<dyn Ability>],
                BTreeSet::from(["light".to_string()]),
            )
            .unwrap();

        let prefix = "/topic/real.1-0.json.nodes.home";
        let destinations: Vec<String> = transport
            .published()
            .iter()
            .map(|message| message.destination.clone())
            .collect();
        assert_eq!(
            destinations,
            vec![
                prefix.to_string(),
                format!("{prefix}.hardwares"),
                format!("{prefix}.hardwares.relays"),
                format!("{prefix}.hardwares.relays.devices"),
                format!("{prefix}.hardwares.relays.devices.lamp"),
                format!("{prefix}.hardwares.relays.devices.lamp.commands"),
                format!("{prefix}.hardwares.relays.devices.lamp.values"),
                format!("{prefix}.hardwares.relays.devices.lamp.commands.on"),
                format!("{prefix}.hardwares.relays.devices.lamp.commands.on.parameters"),
                format!("{prefix}.hardwares.relays.devices.lamp.commands.off"),
                format!("{prefix}.hardwares.relays.devices.lamp.commands.off.parameters"),
                format!("{prefix}.hardwares.relays.devices.lamp.values.on"),
            ]
        );

        // Descriptors are retained for late subscribers.
        assert!(
            transport
                .published()
                .iter()
                .all(hearthbus::protocol::PublishedMessage::persist)
        );
    }

    #[test]
    fn device_descriptor_flattens_ability_names_in_order() {
        let (gateway, transport) = gateway();

        let node = Node::new(&gateway, "home", "Home", "Node").unwrap();
        let hardware = node.add_hardware("hvac", "HVAC", "HVAC").unwrap();
        let dimmer = PowerVariable::new(|| Ok(()), || Ok(()), |_| Ok(()), || Ok(0), || Ok(0));
        let sensor = TemperatureSensor::new();
        hardware
            .add_device_connected(
                "unit",
                "Unit",
                "Ceiling unit",
                vec![dimmer as Arc<dyn Ability>, sensor as Arc<dyn Ability>],
                BTreeSet::new(),
            )
            .unwrap();

        let descriptor = transport
            .published_on("/topic/real.1-0.json.nodes.home.hardwares.hvac.devices.unit");
        assert_eq!(descriptor.len(), 1);
        assert_eq!(
            descriptor[0].json().unwrap()["abilities"],
            json!(["power.variable", "temperaturesensor"])
        );
    }

    #[test]
    fn colliding_ability_value_ids_fail_device_construction() {
        let (gateway, transport) = gateway();

        let node = Node::new(&gateway, "home", "Home", "Node").unwrap();
        let hardware = node.add_hardware("hvac", "HVAC", "HVAC").unwrap();
        // Both abilities materialize a "temperature" value; the second one
        // hits the sibling-id check before anything of it publishes.
        let thermostat = Thermostat::new(|_| Ok(()));
        let sensor = TemperatureSensor::new();
        let result = hardware.add_device_connected(
            "unit",
            "Unit",
            "Unit",
            vec![thermostat as Arc<dyn Ability>, sensor as Arc<dyn Ability>],
            BTreeSet::new(),
        );

        assert!(matches!(result, Err(Error::DuplicateId { .. })));
        // The descriptor published before configure ran still carries the
        // flattened names of both abilities, in declaration order.
        let descriptor = transport
            .published_on("/topic/real.1-0.json.nodes.home.hardwares.hvac.devices.unit");
        assert_eq!(
            descriptor[0].json().unwrap()["abilities"],
            json!(["temperaturesensor.thermostat", "temperaturesensor"])
        );
    }

    #[test]
    fn classes_serialize_on_the_device_descriptor() {
        let (gateway, transport) = gateway();

        let node = Node::new(&gateway, "home", "Home", "Node").unwrap();
        let hardware = node.add_hardware("relays", "Relays", "Relays").unwrap();
        hardware
            .add_device_connected(
                "lamp",
                "Lamp",
                "Lamp",
                Vec::new(),
                BTreeSet::from(["light".to_string(), "bedroom".to_string()]),
            )
            .unwrap();

        let descriptor = transport
            .published_on("/topic/real.1-0.json.nodes.home.hardwares.relays.devices.lamp");
        assert_eq!(
            descriptor[0].json().unwrap()["classes"],
            json!(["bedroom", "light"])
        );
    }
}

// ============================================================================
// Inbound Dispatch Tests
// ============================================================================

mod inbound_dispatch {
    use super::*;

    fn dimmer_device() -> (
        Gateway,
        Arc<MemoryTransport>,
        Arc<hearthbus::DeviceConnected>,
        Arc<AtomicI32>,
        String,
    ) {
        let (gateway, transport) = gateway();
        let node = Node::new(&gateway, "home", "Home", "Node").unwrap();
        let hardware = node.add_hardware("lights", "Lights", "Lights").unwrap();

        let seen = Arc::new(AtomicI32::new(-1));
        let seen_clone = seen.clone();
        let dimmer = PowerVariable::new(
            || Ok(()),
            || Ok(()),
            move |percent| {
                seen_clone.store(percent, Ordering::SeqCst);
                Ok(())
            },
            || Ok(0),
            || Ok(0),
        );
        let device = hardware
            .add_device_connected(
                "lamp",
                "Lamp",
                "Lamp",
                vec![dimmer as Arc<dyn Ability>],
                BTreeSet::new(),
            )
            .unwrap();
        let set_path = device.commands().elements()[2].path().to_string();
        (gateway, transport, device, seen, set_path)
    }

    #[test]
    fn perform_message_reaches_the_set_callback_coerced() {
        let (gateway, transport, _device, seen, set_path) = dimmer_device();

        gateway.dispatch(InboundMessage::new(
            format!("{set_path}.perform"),
            br#"{"opId":"op-1","instanceMap":{"percent":[{"value":"42"}]}}"#.to_vec(),
        ));

        assert_eq!(seen.load(Ordering::SeqCst), 42);

        let statuses = transport.published_on(&format!("{set_path}.performStatus"));
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].json().unwrap()["finished"], false);
        assert_eq!(statuses[1].json().unwrap()["finished"], true);
        assert_eq!(statuses[1].json().unwrap()["error"], serde_json::Value::Null);
    }

    #[test]
    fn unregistered_destination_is_dropped_without_crash() {
        let (gateway, transport, _device, seen, _set_path) = dimmer_device();

        gateway.dispatch(InboundMessage::new(
            "/topic/real.1-0.json.nodes.elsewhere.perform",
            br#"{"opId":"op-2"}"#.to_vec(),
        ));

        assert_eq!(seen.load(Ordering::SeqCst), -1);
        assert!(
            transport
                .published_on("/topic/real.1-0.json.nodes.elsewhere.performStatus")
                .is_empty()
        );
    }

    #[test]
    fn message_without_destination_is_dropped_without_crash() {
        let (gateway, _transport, _device, seen, _set_path) = dimmer_device();

        gateway.dispatch(InboundMessage::without_destination(
            br#"{"opId":"op-3"}"#.to_vec(),
        ));

        assert_eq!(seen.load(Ordering::SeqCst), -1);
    }

    #[test]
    fn malformed_payload_is_contained_and_later_messages_still_dispatch() {
        let (gateway, _transport, _device, seen, set_path) = dimmer_device();

        gateway.dispatch(InboundMessage::new(
            format!("{set_path}.perform"),
            b"not json at all".to_vec(),
        ));
        assert_eq!(seen.load(Ordering::SeqCst), -1);

        gateway.dispatch(InboundMessage::new(
            format!("{set_path}.perform"),
            br#"{"opId":"op-4","instanceMap":{"percent":[{"value":"7"}]}}"#.to_vec(),
        ));
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn dispatcher_task_drives_commands_from_the_stream() {
        let (gateway, transport, _device, seen, set_path) = dimmer_device();

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let handle = gateway.spawn_dispatcher(rx);

        tx.send(InboundMessage::new(
            format!("{set_path}.perform"),
            br#"{"opId":"op-5","instanceMap":{"percent":[{"value":"63"}]}}"#.to_vec(),
        ))
        .unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 63);
        let statuses = transport.published_on(&format!("{set_path}.performStatus"));
        assert_eq!(statuses.len(), 2);
    }
}

// ============================================================================
// Perform Failure Containment Tests
// ============================================================================

mod perform_failures {
    use super::*;

    #[test]
    fn failing_callback_still_finishes_the_status_with_the_error() {
        let (gateway, transport) = gateway();
        let node = Node::new(&gateway, "home", "Home", "Node").unwrap();
        let hardware = node.add_hardware("relays", "Relays", "Relays").unwrap();

        let power = Power::new(
            || Err(Error::Callback("relay stuck".to_string())),
            || Ok(()),
        );
        let device = hardware
            .add_device_connected(
                "lamp",
                "Lamp",
                "Lamp",
                vec![power as Arc<dyn Ability>],
                BTreeSet::new(),
            )
            .unwrap();
        let on_path = device.commands().elements()[0].path().to_string();

        gateway.dispatch(InboundMessage::new(
            format!("{on_path}.perform"),
            br#"{"opId":"op-1"}"#.to_vec(),
        ));

        let statuses = transport.published_on(&format!("{on_path}.performStatus"));
        assert_eq!(statuses.len(), 2);
        let last = statuses[1].json().unwrap();
        assert_eq!(last["opId"], "op-1");
        assert_eq!(last["finished"], true);
        assert_eq!(last["error"], "callback failed: relay stuck");

        // The failed callback never republished the value.
        let value_path = format!("{}.value", device.values().elements()[0].path());
        assert!(transport.published_on(&value_path).is_empty());
    }

    #[test]
    fn each_invocation_gets_its_own_status_pair() {
        let (gateway, transport) = gateway();
        let node = Node::new(&gateway, "home", "Home", "Node").unwrap();
        let hardware = node.add_hardware("relays", "Relays", "Relays").unwrap();

        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();
        let power = Power::new(
            move || {
                // Fail every other invocation.
                if count_clone.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                    Err(Error::Callback("flaky".to_string()))
                } else {
                    Ok(())
                }
            },
            || Ok(()),
        );
        let device = hardware
            .add_device_connected(
                "lamp",
                "Lamp",
                "Lamp",
                vec![power as Arc<dyn Ability>],
                BTreeSet::new(),
            )
            .unwrap();
        let on_path = device.commands().elements()[0].path().to_string();

        for op in ["a", "b", "c"] {
            let body = format!(r#"{{"opId":"{op}"}}"#);
            gateway.dispatch(InboundMessage::new(
                format!("{on_path}.perform"),
                body.into_bytes(),
            ));
        }

        let statuses = transport.published_on(&format!("{on_path}.performStatus"));
        assert_eq!(statuses.len(), 6);
        for (index, op) in ["a", "b", "c"].iter().enumerate() {
            let first = statuses[index * 2].json().unwrap();
            let second = statuses[index * 2 + 1].json().unwrap();
            assert_eq!(first["opId"], *op);
            assert_eq!(first["finished"], false);
            assert_eq!(second["opId"], *op);
            assert_eq!(second["finished"], true);
        }
        // Invocations a and c failed, b succeeded.
        assert!(statuses[1].json().unwrap()["error"].is_string());
        assert!(statuses[3].json().unwrap()["error"].is_null());
        assert!(statuses[5].json().unwrap()["error"].is_string());
    }
}

// ============================================================================
// Ability Round-Trip Tests
// ============================================================================

mod ability_round_trips {
    use super::*;

    #[test]
    fn thermostat_setpoint_flows_bus_to_callback_to_echo() {
        let (gateway, transport) = gateway();
        let node = Node::new(&gateway, "home", "Home", "Node").unwrap();
        let hardware = node.add_hardware("heating", "Heating", "Heating").unwrap();

        let thermostat = Thermostat::new(|_| Ok(()));
        let device = hardware
            .add_device_connected(
                "boiler",
                "Boiler",
                "Boiler",
                vec![Arc::clone(&thermostat) as Arc<dyn Ability>],
                BTreeSet::new(),
            )
            .unwrap();
        let set_path = device.commands().elements()[0].path().to_string();

        gateway.dispatch(InboundMessage::new(
            format!("{set_path}.perform"),
            br#"{"opId":"op-1","instanceMap":{"percent":[{"value":"19.5"}]}}"#.to_vec(),
        ));

        let temperature_path = format!("{}.value", device.values().elements()[0].path());
        let updates = transport.published_on(&temperature_path);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].json().unwrap(), json!([{ "value": "19.5" }]));

        // Sensor pushes keep working independently of inbound commands.
        thermostat.set_temperature(21.0).unwrap();
        assert_eq!(transport.published_on(&temperature_path).len(), 2);
    }

    #[test]
    fn disconnect_stops_pushes_but_not_the_process() {
        let (gateway, _transport) = gateway();
        let node = Node::new(&gateway, "home", "Home", "Node").unwrap();
        let hardware = node.add_hardware("relays", "Relays", "Relays").unwrap();
        let power = Power::new(|| Ok(()), || Ok(()));
        hardware
            .add_device_connected(
                "lamp",
                "Lamp",
                "Lamp",
                vec![Arc::clone(&power) as Arc<dyn Ability>],
                BTreeSet::new(),
            )
            .unwrap();

        gateway.disconnect().unwrap();

        let result: Result<()> = power.set_on(true);
        assert!(matches!(result, Err(Error::Protocol(_))));
    }
}
