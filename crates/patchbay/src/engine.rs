//! Network inference: evaluates every declared connection against the
//! placed devices and derives cable suggestions, workflow sentences, and
//! network-wide warnings.
//!
//! Each call is a full recomputation over its inputs. Nothing is cached
//! between calls and the inputs are never mutated.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::connector::adapter_phrase;
use crate::resolver::{resolve, Compatibility};
use crate::types::{
    AudioWiring, CableSuggestion, Connection, ConnectionStatus, DeviceInstance, Direction,
    InferenceOptions, InferenceResult, InstanceId, Port, PortReference, Signal,
};

pub const MIXER_HINT: &str =
    "Several audio devices share the monitor path; add a mixer so every device can be heard";
pub const CLOCK_MASTER_MISSING: &str = "Set a MIDI clock master so connected devices stay in sync";
pub const CLOCK_MASTER_MULTIPLE: &str = "Multiple MIDI clock masters are set; choose only one";
pub const BALANCED_MISMATCH: &str =
    "Balanced and unbalanced mono ports are connected; expect extra noise or a level change";
pub const STEREO_TO_MONO: &str =
    "Stereo and mono ports are connected; one channel may be lost or the channels may cancel";

/// Evaluate a network snapshot.
pub fn infer(
    instances: &[DeviceInstance],
    connections: &[Connection],
    options: &InferenceOptions,
) -> InferenceResult {
    let index: HashMap<&InstanceId, &DeviceInstance> =
        instances.iter().map(|i| (&i.id, i)).collect();

    let mut topology = Topology::default();
    let mut warnings = Warnings::default();
    let mut result = InferenceResult::default();

    for connection in connections {
        let evaluation = evaluate(&index, connection);

        if let Some(outcome) = &evaluation.outcome {
            topology.record(connection, outcome);
            for advisory in &outcome.electrical {
                warnings.push(advisory.clone());
            }
            result.suggestions.push(outcome.suggestion.clone());
            result.workflows.push(outcome.workflow.clone());
        }

        debug!(
            connection = %connection.id,
            status = %evaluation.connection.status,
            issues = evaluation.connection.issues.len(),
            "evaluated connection"
        );
        result.connections.push(evaluation.connection);
    }

    topology.global_warnings(instances, options, &mut warnings);
    result.warnings = warnings.into_vec();

    debug!(
        connections = result.connections.len(),
        suggestions = result.suggestions.len(),
        warnings = result.warnings.len(),
        "network inference complete"
    );
    result
}

struct Evaluation {
    connection: Connection,
    /// Present when nothing blocked the connection.
    outcome: Option<Outcome>,
}

struct Outcome {
    suggestion: CableSuggestion,
    workflow: String,
    electrical: Vec<String>,
    shared: BTreeSet<Signal>,
    from_direction: Direction,
    to_direction: Direction,
    from_monitor: bool,
    to_monitor: bool,
}

#[derive(Clone, Copy)]
enum Side {
    Source,
    Destination,
}

impl Side {
    fn label(&self) -> &'static str {
        match self {
            Side::Source => "Source",
            Side::Destination => "Destination",
        }
    }
}

fn lookup<'a>(
    index: &HashMap<&InstanceId, &'a DeviceInstance>,
    reference: &PortReference,
    side: Side,
    blocking: &mut Vec<String>,
) -> Option<(&'a DeviceInstance, &'a Port)> {
    let Some(instance) = index.get(&reference.instance_id).copied() else {
        blocking.push(format!(
            "{} device {} is no longer in the network",
            side.label(),
            reference.device_label()
        ));
        return None;
    };

    match instance.device.port(&reference.port_id) {
        Some(port) => Some((instance, port)),
        None => {
            blocking.push(format!(
                "{} port {} was not found on {}",
                side.label(),
                reference.port_id,
                instance.display_name()
            ));
            None
        }
    }
}

/// Declared name, then the stored device name, then the raw device id.
fn device_label<'a>(reference: &'a PortReference, instance: Option<&'a DeviceInstance>) -> &'a str {
    if let Some(name) = reference.device_name.as_deref().filter(|n| !n.is_empty()) {
        return name;
    }
    if let Some(name) = instance.map(|i| i.device.name.as_str()).filter(|n| !n.is_empty()) {
        return name;
    }
    &reference.device_id.0
}

fn evaluate(index: &HashMap<&InstanceId, &DeviceInstance>, connection: &Connection) -> Evaluation {
    let mut blocking = Vec::new();
    let mut advisory = Vec::new();

    let from = lookup(index, &connection.from, Side::Source, &mut blocking);
    let to = lookup(index, &connection.to, Side::Destination, &mut blocking);

    let mut outcome = None;

    if let (Some((from_instance, from_port)), Some((to_instance, to_port))) = (from, to) {
        let from_label = device_label(&connection.from, Some(from_instance));
        let to_label = device_label(&connection.to, Some(to_instance));

        if from_port.direction == Direction::In {
            blocking.push(format!(
                "{} on {} is an input and cannot send signals",
                from_port.label(),
                from_label
            ));
        }
        if to_port.direction == Direction::Out {
            blocking.push(format!(
                "{} on {} is an output and cannot receive signals",
                to_port.label(),
                to_label
            ));
        }

        if let (Some(a), Some(b)) = (from_port.resolved_domain(), to_port.resolved_domain()) {
            if a != b {
                blocking.push(format!("Cannot connect {} port to {} port", a, b));
            }
        }

        let shared = from_port.shared_signals(to_port);
        if shared.is_empty() {
            blocking.push(format!(
                "{} ({}) and {} ({}) share no signal type",
                from_port.label(),
                signal_list(&from_port.signals),
                to_port.label(),
                signal_list(&to_port.signals)
            ));
        }

        let compatibility = resolve(from_port, to_port);
        if !compatibility.is_compatible() {
            blocking.push(format!(
                "{} cannot connect to {}",
                from_port.connector.label(),
                to_port.connector.label()
            ));
        }

        let mut suggestion = None;
        if blocking.is_empty() {
            let mut cable = CableSuggestion {
                description: String::new(),
                connector: compatibility.connector().unwrap_or(from_port.connector),
                from: connection.from.clone(),
                to: connection.to.clone(),
                adapter_requirement: None,
                adapters: compatibility.adapters().to_vec(),
            };
            if let Compatibility::Adapted { adapters, .. } = &compatibility {
                let phrase = adapter_phrase(adapters);
                let message = format!("Use {}", phrase);
                advisory.push(message.clone());
                cable.adapter_requirement = Some(message);
                cable.description = phrase;
            } else {
                cable.description = format!(
                    "{} cable for {}",
                    cable.connector.label(),
                    signal_list(&shared)
                );
            }
            suggestion = Some(cable);
        }

        let electrical = wiring_advisories(from_port.audio_wiring, to_port.audio_wiring);
        advisory.extend(electrical.iter().cloned());

        if let Some(suggestion) = suggestion {
            let workflow = format!("{} → {}: Use {}.", from_label, to_label, suggestion.description);
            outcome = Some(Outcome {
                suggestion,
                workflow,
                electrical,
                shared,
                from_direction: from_port.direction,
                to_direction: to_port.direction,
                from_monitor: from_instance.device.is_monitor(),
                to_monitor: to_instance.device.is_monitor(),
            });
        }
    }

    let status = if !blocking.is_empty() {
        ConnectionStatus::Invalid
    } else if !advisory.is_empty() {
        ConnectionStatus::Pending
    } else {
        ConnectionStatus::Valid
    };

    let mut issues = blocking;
    issues.extend(advisory);

    Evaluation {
        connection: Connection {
            status,
            issues,
            ..connection.clone()
        },
        outcome,
    }
}

fn wiring_advisories(from: Option<AudioWiring>, to: Option<AudioWiring>) -> Vec<String> {
    let (Some(a), Some(b)) = (from, to) else {
        return Vec::new();
    };

    let mut messages = Vec::new();
    if matches!(
        (a, b),
        (AudioWiring::BalancedMono, AudioWiring::UnbalancedMono)
            | (AudioWiring::UnbalancedMono, AudioWiring::BalancedMono)
    ) {
        messages.push(BALANCED_MISMATCH.to_string());
    }
    if (a == AudioWiring::UnbalancedStereo && b.is_mono())
        || (b == AudioWiring::UnbalancedStereo && a.is_mono())
    {
        messages.push(STEREO_TO_MONO.to_string());
    }
    messages
}

/// "a", "a and b", "a, b and c".
fn signal_list(signals: &BTreeSet<Signal>) -> String {
    let labels: Vec<&str> = signals.iter().map(Signal::label).collect();
    match labels.as_slice() {
        [] => String::from("nothing"),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Ordered warning set: first occurrence wins, duplicates collapse.
#[derive(Default)]
struct Warnings {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl Warnings {
    fn push(&mut self, warning: String) {
        if self.seen.insert(warning.clone()) {
            self.ordered.push(warning);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

#[derive(Default)]
struct Topology {
    midi_chain: HashSet<InstanceId>,
    audio_linked: HashSet<InstanceId>,
    feeds_monitor: HashSet<InstanceId>,
}

impl Topology {
    fn record(&mut self, connection: &Connection, outcome: &Outcome) {
        let from = &connection.from.instance_id;
        let to = &connection.to.instance_id;

        if outcome.shared.iter().any(Signal::is_midi) {
            self.midi_chain.insert(from.clone());
            self.midi_chain.insert(to.clone());
        }

        if outcome.shared.iter().any(Signal::is_audio) {
            if outcome.from_direction != Direction::In {
                self.audio_linked.insert(from.clone());
            }
            if outcome.to_direction != Direction::In {
                self.audio_linked.insert(to.clone());
            }
            if outcome.to_monitor {
                self.feeds_monitor.insert(from.clone());
            }
            if outcome.from_monitor {
                self.feeds_monitor.insert(to.clone());
            }
        }
    }

    fn global_warnings(&self, instances: &[DeviceInstance], options: &InferenceOptions, warnings: &mut Warnings) {
        let has_monitor = instances.iter().any(|i| i.device.is_monitor());
        let audio_capable = instances.iter().filter(|i| i.device.has_audio_output()).count();

        if self.midi_chain.len() >= 2 {
            let unrouted: Vec<&DeviceInstance> = instances
                .iter()
                .filter(|i| self.midi_chain.contains(&i.id))
                .filter(|i| i.device.has_audio_output())
                .filter(|i| !self.audio_linked.contains(&i.id) && !i.device.is_monitor())
                .collect();

            if !unrouted.is_empty() {
                if has_monitor && self.feeds_monitor.len() <= 1 && audio_capable > 1 {
                    warnings.push(MIXER_HINT.to_string());
                }
                let names: Vec<&str> = unrouted.iter().map(|i| i.display_name()).collect();
                warnings.push(format!(
                    "Audio from {} is not routed to any destination",
                    names.join(", ")
                ));
            }
        }

        let midi_capable: Vec<&DeviceInstance> =
            instances.iter().filter(|i| i.device.is_midi_capable()).collect();

        for instance in &midi_capable {
            if !self.midi_chain.contains(&instance.id) {
                warnings.push(format!(
                    "{} has MIDI ports but is not connected to the MIDI clock network",
                    instance.display_name()
                ));
            }
        }

        let masters: Vec<&InstanceId> = {
            let mut seen = HashSet::new();
            options.clock_masters.iter().filter(|m| seen.insert(*m)).collect()
        };

        if !midi_capable.is_empty() && masters.is_empty() {
            warnings.push(CLOCK_MASTER_MISSING.to_string());
        }
        if masters.len() > 1 {
            warnings.push(CLOCK_MASTER_MULTIPLE.to_string());
        }

        for master in masters {
            let instance = instances.iter().find(|i| &i.id == master);
            let name = instance.map(|i| i.display_name()).unwrap_or(&master.0);
            match instance {
                Some(i) if i.device.is_midi_capable() => {
                    if !self.midi_chain.contains(master) {
                        warnings.push(format!(
                            "{} is the clock master but is not connected to any MIDI devices",
                            name
                        ));
                    }
                }
                _ => warnings.push(format!("{} is the clock master but has no MIDI ports", name)),
            }
        }
    }
}
