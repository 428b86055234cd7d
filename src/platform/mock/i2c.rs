//! Mock I2C bus for testing

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation, SevenBitAddress};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// I2C transaction type for logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I2cTransaction {
    /// Write transaction
    Write { addr: u8, data: Vec<u8> },
    /// Read transaction
    Read { addr: u8, len: usize },
    /// Write-Read transaction
    WriteRead {
        addr: u8,
        write_data: Vec<u8>,
        read_len: usize,
    },
}

/// Error returned by [`MockI2c`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockI2cError(pub ErrorKind);

impl embedded_hal::i2c::Error for MockI2cError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// One simulated device: a 256-byte register file with an auto-incrementing
/// register pointer
#[derive(Debug)]
struct Target {
    registers: [u8; 256],
    pointer: u8,
    scripted: HashMap<u8, VecDeque<u8>>,
    pinned: HashMap<u8, u8>,
    raw_reads: VecDeque<Vec<u8>>,
}

impl Default for Target {
    fn default() -> Self {
        Self {
            registers: [0; 256],
            pointer: 0,
            scripted: HashMap::new(),
            pinned: HashMap::new(),
            raw_reads: VecDeque::new(),
        }
    }
}

impl Target {
    fn write(&mut self, data: &[u8]) {
        let Some((&register, values)) = data.split_first() else {
            return;
        };
        self.pointer = register;
        for &value in values {
            if !self.pinned.contains_key(&self.pointer) {
                self.registers[usize::from(self.pointer)] = value;
            }
            self.pointer = self.pointer.wrapping_add(1);
        }
    }

    fn read_registers(&mut self, buffer: &mut [u8]) {
        for byte in buffer.iter_mut() {
            let register = self.pointer;
            *byte = match self
                .scripted
                .get_mut(&register)
                .and_then(VecDeque::pop_front)
            {
                Some(value) => value,
                None => match self.pinned.get(&register) {
                    Some(&value) => value,
                    None => self.registers[usize::from(register)],
                },
            };
            self.pointer = self.pointer.wrapping_add(1);
        }
    }

    fn read_raw(&mut self, buffer: &mut [u8]) {
        match self.raw_reads.pop_front() {
            Some(bytes) => {
                let len = buffer.len().min(bytes.len());
                buffer[..len].copy_from_slice(&bytes[..len]);
                buffer[len..].fill(0);
            }
            None => self.read_registers(buffer),
        }
    }
}

#[derive(Debug, Default)]
struct BusState {
    targets: HashMap<u8, Target>,
    log: Vec<I2cTransaction>,
    fail_next: Option<ErrorKind>,
    faults: HashMap<(u8, u8), ErrorKind>,
}

/// Mock I2C bus
///
/// Simulates register-file devices at fixed addresses and records every
/// transaction for test verification. Clones share the same bus, so a test can
/// keep one clone for inspection while drivers own others.
///
/// Register reads are served, in order of precedence, from per-register
/// scripted values, pinned values, then the register file. Writes to a pinned
/// register are accepted on the bus but do not change what reads return.
/// Transactions addressed to an unknown device fail with a NACK.
#[derive(Debug, Clone, Default)]
pub struct MockI2c {
    state: Arc<Mutex<BusState>>,
}

impl MockI2c {
    /// Create a bus with no devices
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make a device acknowledge at `addr`
    pub fn add_device(&self, addr: u8) {
        self.lock().targets.entry(addr).or_default();
    }

    /// Set a register value (adds the device if needed)
    pub fn set_register(&self, addr: u8, register: u8, value: u8) {
        let mut state = self.lock();
        let target = state.targets.entry(addr).or_default();
        target.registers[usize::from(register)] = value;
    }

    /// Current register file value
    pub fn register(&self, addr: u8, register: u8) -> u8 {
        self.lock()
            .targets
            .get(&addr)
            .map_or(0, |t| t.registers[usize::from(register)])
    }

    /// Queue values returned by successive reads of `register`
    pub fn queue_reads(&self, addr: u8, register: u8, values: &[u8]) {
        let mut state = self.lock();
        let target = state.targets.entry(addr).or_default();
        target
            .scripted
            .entry(register)
            .or_default()
            .extend(values.iter().copied());
    }

    /// Make `register` always read as `value`, ignoring writes
    pub fn pin_register(&self, addr: u8, register: u8, value: u8) {
        let mut state = self.lock();
        state.targets.entry(addr).or_default().pinned.insert(register, value);
    }

    /// Queue the payload of the next register-less read from `addr`
    pub fn queue_raw_read(&self, addr: u8, bytes: &[u8]) {
        let mut state = self.lock();
        state
            .targets
            .entry(addr)
            .or_default()
            .raw_reads
            .push_back(bytes.to_vec());
    }

    /// Fail the next transaction on the bus
    pub fn fail_next(&self, kind: ErrorKind) {
        self.lock().fail_next = Some(kind);
    }

    /// Fail every transaction that starts by addressing `register`
    pub fn fail_register(&self, addr: u8, register: u8, kind: ErrorKind) {
        self.lock().faults.insert((addr, register), kind);
    }

    /// Remove all injected faults
    pub fn clear_faults(&self) {
        let mut state = self.lock();
        state.fail_next = None;
        state.faults.clear();
    }

    /// Get transaction log (for test verification)
    pub fn transactions(&self) -> Vec<I2cTransaction> {
        self.lock().log.clone()
    }

    /// Clear transaction log
    pub fn clear_transactions(&self) {
        self.lock().log.clear();
    }

    /// Number of register reads (write-read transactions) starting at `register`
    pub fn reads_of(&self, addr: u8, register: u8) -> usize {
        self.lock()
            .log
            .iter()
            .filter(|t| {
                matches!(t, I2cTransaction::WriteRead { addr: a, write_data, .. }
                    if *a == addr && write_data.as_slice() == [register])
            })
            .count()
    }

    /// Values written to `register` by single-register writes, in order
    pub fn writes_to(&self, addr: u8, register: u8) -> Vec<u8> {
        self.lock()
            .log
            .iter()
            .filter_map(|t| match t {
                I2cTransaction::Write { addr: a, data } if *a == addr => match data.as_slice() {
                    [r, value] if *r == register => Some(*value),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }
}

fn describe(addr: u8, operations: &[Operation<'_>]) -> I2cTransaction {
    match operations {
        [Operation::Write(data), Operation::Read(buffer)] => I2cTransaction::WriteRead {
            addr,
            write_data: data.to_vec(),
            read_len: buffer.len(),
        },
        [Operation::Read(buffer)] => I2cTransaction::Read {
            addr,
            len: buffer.len(),
        },
        _ => I2cTransaction::Write {
            addr,
            data: operations
                .iter()
                .flat_map(|op| match op {
                    Operation::Write(data) => data.to_vec(),
                    Operation::Read(_) => Vec::new(),
                })
                .collect(),
        },
    }
}

impl ErrorType for MockI2c {
    type Error = MockI2cError;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut state = self.lock();
        state.log.push(describe(address, operations));

        if let Some(kind) = state.fail_next.take() {
            return Err(MockI2cError(kind));
        }
        let register = match operations.first() {
            Some(Operation::Write(data)) => data.first().copied(),
            _ => None,
        };
        if let Some(kind) = register.and_then(|r| state.faults.get(&(address, r)).copied()) {
            return Err(MockI2cError(kind));
        }

        let target = state
            .targets
            .get_mut(&address)
            .ok_or(MockI2cError(ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Address,
            )))?;

        let mut addressed = false;
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(data) => {
                    target.write(data);
                    addressed = true;
                }
                Operation::Read(buffer) if addressed => target.read_registers(buffer),
                Operation::Read(buffer) => target.read_raw(buffer),
            }
        }
        Ok(())
    }
}
