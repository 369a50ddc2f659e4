use std::time::{Duration, Instant};

use log::{debug, warn};

use wraith_client::{ClientConfig, MoveInput, ReplicationClient};
use wraith_server::{InterestQuery, ReplicationServer, ScopeAll, ServerConfig, ViewerKey};
use wraith_shared::{GhostIndex, NetId, Replica};

use crate::local_link::{Datagram, Delivery, LossyLink};

/// One connected client with its two link directions
pub struct TestViewer {
    pub key: ViewerKey,
    pub client: ReplicationClient,
    /// Server to client
    pub downlink: LossyLink,
    /// Client to server
    pub uplink: LossyLink,
    /// Input the client predicts every step while it controls a ship
    pub input: MoveInput,
}

/// Runs a server and its clients in lock step over in-memory links.
pub struct Harness {
    pub server: ReplicationServer,
    pub viewers: Vec<TestViewer>,
    interest: Box<dyn InterestQuery>,
    now: Instant,
    steps: u64,
}

impl Harness {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            server: ReplicationServer::new(config),
            viewers: Vec::new(),
            interest: Box::new(ScopeAll),
            now: Instant::now(),
            steps: 0,
        }
    }

    pub fn with_interest(mut self, interest: impl InterestQuery + 'static) -> Self {
        self.interest = Box::new(interest);
        self
    }

    /// A client configured to match the server
    pub fn client_config(&self) -> ClientConfig {
        let config = self.server.config();
        ClientConfig {
            protocol: config.protocol.clone(),
            dynamics: config.dynamics.clone(),
            ..ClientConfig::default()
        }
    }

    /// Connects a viewer whose packets both ways go over `downlink` and a
    /// reliable uplink. Returns its position in `viewers`.
    pub fn add_viewer(&mut self, downlink: LossyLink) -> usize {
        let config = self.client_config();
        self.add_viewer_with(config, downlink, LossyLink::reliable())
    }

    pub fn add_viewer_with(
        &mut self,
        config: ClientConfig,
        downlink: LossyLink,
        uplink: LossyLink,
    ) -> usize {
        let key = self.server.connect_viewer();
        self.viewers.push(TestViewer {
            key,
            client: ReplicationClient::new(config),
            downlink,
            uplink,
            input: MoveInput::default(),
        });
        self.viewers.len() - 1
    }

    pub fn viewer(&self, viewer: usize) -> &TestViewer {
        &self.viewers[viewer]
    }

    pub fn viewer_mut(&mut self, viewer: usize) -> &mut TestViewer {
        &mut self.viewers[viewer]
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn tick_interval(&self) -> Duration {
        self.server.config().protocol.tick_interval
    }

    /// Ghost index the server bound for `net_id` on this viewer's connection
    pub fn ghost_of(&self, viewer: usize, net_id: &NetId) -> Option<GhostIndex> {
        self.server
            .connection(&self.viewers[viewer].key)
            .and_then(|connection| connection.ghost_of(net_id))
    }

    /// The client's proxy for a server entity, if it has one
    pub fn client_replica(&self, viewer: usize, net_id: &NetId) -> Option<&Replica> {
        let ghost = self.ghost_of(viewer, net_id)?;
        self.viewers[viewer].client.ghost(&ghost)
    }

    /// One full round: clients send moves, the server applies them and ticks,
    /// every viewer gets a packet, the links report each packet's fate back
    /// to the server, and clients render one frame.
    pub fn step(&mut self) {
        let interval = self.tick_interval();
        self.now += interval;
        self.steps += 1;

        for viewer in self.viewers.iter_mut() {
            if viewer.client.control().is_some() {
                match viewer.client.tick(&viewer.input) {
                    Ok(bytes) => viewer.uplink.send(Datagram::new(None, bytes)),
                    Err(error) => debug!("{}: no moves sent: {}", viewer.key, error),
                }
            }
            for delivery in viewer.uplink.deliver() {
                if let Delivery::Delivered(datagram) = delivery {
                    if let Err(error) = self.server.receive_moves(&viewer.key, &datagram.bytes) {
                        warn!("{}: {}", viewer.key, error);
                    }
                }
            }
        }

        self.server.tick(interval);

        let packets = self.server.send_all_packets(self.now, self.interest.as_ref());
        for (key, packet_index, bytes) in packets {
            if let Some(viewer) = self.viewers.iter_mut().find(|viewer| viewer.key == key) {
                viewer
                    .downlink
                    .send(Datagram::new(Some(packet_index), bytes));
            }
        }

        for viewer in self.viewers.iter_mut() {
            for delivery in viewer.downlink.deliver() {
                match delivery {
                    Delivery::Delivered(datagram) => {
                        if let Err(error) = viewer.client.receive_packet(&datagram.bytes) {
                            warn!("{}: {}", viewer.key, error);
                        }
                        if let Some(packet_index) = datagram.packet_index {
                            self.server.on_packet_acked(&viewer.key, packet_index);
                        }
                    }
                    Delivery::Lost(datagram) => {
                        if let Some(packet_index) = datagram.packet_index {
                            self.server.on_packet_lost(&viewer.key, packet_index);
                        }
                    }
                }
            }
            viewer.client.advance_frame(interval.as_secs_f32());
        }
    }

    pub fn step_n(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Steps until `done` holds, at most `max_steps` times. Returns whether it
    /// held.
    pub fn step_until(&mut self, max_steps: usize, mut done: impl FnMut(&Harness) -> bool) -> bool {
        for _ in 0..max_steps {
            if done(self) {
                return true;
            }
            self.step();
        }
        done(self)
    }
}
