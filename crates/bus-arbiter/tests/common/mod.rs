#![allow(dead_code)]

use std::sync::{Arc, Barrier, Mutex};

use bus_arbiter::{
    BusFactory, I2cConfig, I2cHardware, I2cPins, SpiHardware, SpiPins,
    SpiSettings,
};
use embedded_hal::i2c::{NoAcknowledgeSource, Operation};

// ---------------------------------------------------------------------------
// Call journal
// ---------------------------------------------------------------------------

/// One call made into the mock hardware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Configure(SpiSettings),
    SpiWrite(Vec<u8>),
    SpiRead { len: usize, fill: u8 },
    Probe(u8),
    I2cRead { address: u8, len: usize },
    I2cWrite { address: u8, data: Vec<u8>, stop: bool },
    /// One start/stop-framed transaction holding every operation in order.
    Transaction { address: u8, ops: Vec<Op> },
}

/// One operation inside a recorded [`Call::Transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Read(usize),
    Write(Vec<u8>),
}

/// Everything the mock hardware saw, plus knobs to make it misbehave.
#[derive(Debug, Default)]
pub struct Journal {
    pub calls: Vec<Call>,
    pub create_count: usize,
    pub recover_count: usize,
    /// Frequency passed to the last I2C `create`.
    pub frequency: Option<u32>,
    /// If set, `create` fails.
    pub fail_create: bool,
    /// If set, every configure/read/write fails (after being recorded).
    pub fail_transfers: bool,
    /// I2C addresses that acknowledge a probe.
    pub devices: Vec<u8>,
    /// Byte returned for every byte read.
    pub incoming: u8,
    /// If set, an SPI write waits on this barrier twice after recording,
    /// once to announce it is in flight and once to be let go.
    pub gate: Option<Arc<Barrier>>,
}

/// Shared handle onto a [`Journal`]; every mock pin carries one.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Journal>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Journal) -> R) -> R {
        f(&mut self.0.lock().unwrap())
    }

    pub fn pin(&self, id: u8) -> MockPin {
        MockPin { id, recorder: self.clone() }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with(|j| j.calls.clone())
    }

    pub fn create_count(&self) -> usize {
        self.with(|j| j.create_count)
    }

    pub fn recover_count(&self) -> usize {
        self.with(|j| j.recover_count)
    }

    fn record(&self, call: Call) -> Result<(), MockError> {
        self.with(|j| {
            j.calls.push(call);
            if j.fail_transfers {
                Err(MockError)
            } else {
                Ok(())
            }
        })
    }
}

#[derive(Debug)]
pub struct MockPin {
    pub id: u8,
    recorder: Recorder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "mock failure")
    }
}

impl embedded_hal::i2c::Error for MockError {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        embedded_hal::i2c::ErrorKind::NoAcknowledge(
            NoAcknowledgeSource::Address,
        )
    }
}

// ---------------------------------------------------------------------------
// SPI mock
// ---------------------------------------------------------------------------

pub struct MockSpi {
    recorder: Recorder,
}

impl SpiHardware for MockSpi {
    type Error = MockError;

    fn configure(&mut self, settings: &SpiSettings) -> Result<(), MockError> {
        self.recorder.record(Call::Configure(*settings))
    }

    fn write(&mut self, data: &[u8]) -> Result<(), MockError> {
        self.recorder.record(Call::SpiWrite(data.to_vec()))?;
        if let Some(gate) = self.recorder.with(|j| j.gate.clone()) {
            gate.wait();
            gate.wait();
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8], fill: u8) -> Result<(), MockError> {
        self.recorder.record(Call::SpiRead { len: buf.len(), fill })?;
        buf.fill(self.recorder.with(|j| j.incoming));
        Ok(())
    }
}

pub struct MockSpiFactory;

impl BusFactory for MockSpiFactory {
    type Bus = MockSpi;
    type Resources = SpiPins<MockPin>;
    type Config = ();
    type Destructor = SpiPins<MockPin>;
    type Error = MockError;

    fn create(
        resources: Self::Resources,
        _config: &(),
    ) -> Result<(Self::Bus, Self::Destructor), (Self::Error, Self::Resources)>
    {
        let recorder = resources.clock.recorder.clone();
        let fail = recorder.with(|j| {
            j.create_count += 1;
            j.fail_create
        });
        if fail {
            return Err((MockError, resources));
        }
        Ok((MockSpi { recorder }, resources))
    }

    fn recover(destructor: Self::Destructor) -> Self::Resources {
        destructor.clock.recorder.with(|j| j.recover_count += 1);
        destructor
    }
}

// ---------------------------------------------------------------------------
// I2C mock
// ---------------------------------------------------------------------------

pub struct MockI2c {
    recorder: Recorder,
}

impl I2cHardware for MockI2c {
    type Error = MockError;

    fn probe(&mut self, address: u8) -> bool {
        self.recorder.with(|j| {
            j.calls.push(Call::Probe(address));
            j.devices.contains(&address)
        })
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), MockError> {
        self.recorder.record(Call::I2cRead { address, len: buf.len() })?;
        buf.fill(self.recorder.with(|j| j.incoming));
        Ok(())
    }

    fn write(
        &mut self,
        address: u8,
        data: &[u8],
        stop: bool,
    ) -> Result<(), MockError> {
        self.recorder.record(Call::I2cWrite {
            address,
            data: data.to_vec(),
            stop,
        })
    }

    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), MockError> {
        let ops = operations
            .iter()
            .map(|op| match op {
                Operation::Read(buf) => Op::Read(buf.len()),
                Operation::Write(data) => Op::Write(data.to_vec()),
            })
            .collect();
        self.recorder.record(Call::Transaction { address, ops })?;

        let incoming = self.recorder.with(|j| j.incoming);
        for op in operations.iter_mut() {
            if let Operation::Read(buf) = op {
                buf.fill(incoming);
            }
        }
        Ok(())
    }
}

pub struct MockI2cFactory;

impl BusFactory for MockI2cFactory {
    type Bus = MockI2c;
    type Resources = I2cPins<MockPin>;
    type Config = I2cConfig;
    type Destructor = I2cPins<MockPin>;
    type Error = MockError;

    fn create(
        resources: Self::Resources,
        config: &I2cConfig,
    ) -> Result<(Self::Bus, Self::Destructor), (Self::Error, Self::Resources)>
    {
        let recorder = resources.scl.recorder.clone();
        let fail = recorder.with(|j| {
            j.create_count += 1;
            j.frequency = Some(config.frequency);
            j.fail_create
        });
        if fail {
            return Err((MockError, resources));
        }
        Ok((MockI2c { recorder }, resources))
    }

    fn recover(destructor: Self::Destructor) -> Self::Resources {
        destructor.scl.recorder.with(|j| j.recover_count += 1);
        destructor
    }
}
