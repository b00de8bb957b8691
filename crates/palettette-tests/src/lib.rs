//! Integration test harness for Palettette.
//!
//! This crate provides utilities for end-to-end testing of whole programs:
//! Manifest → Grid → Run → Verify.

use palettette_run::{DriveError, ProgramManifest, RunReport, drive};
use palettette_vm::{Direction, Grid, Interpreter, Location, Pixel, Status};

/// Step budget used by [`TestHarness::run_to_halt`].
pub const DEFAULT_STEP_LIMIT: u64 = 100_000;

/// Test harness for running Palettette programs.
pub struct TestHarness {
    vm: Interpreter,
}

impl TestHarness {
    /// Create a harness from a YAML program manifest.
    ///
    /// # Panics
    ///
    /// Panics if the manifest fails to parse or does not form a grid.
    pub fn from_yaml(yaml: &str) -> Self {
        let manifest = match ProgramManifest::from_yaml(yaml) {
            Ok(m) => m,
            Err(e) => panic!("Manifest failed to load: {e}"),
        };
        let vm = manifest.interpreter(None).expect("manifest grid is invalid");
        Self { vm }
    }

    /// Create a harness from rows of colour triples.
    ///
    /// # Panics
    ///
    /// Panics if the rows are empty or ragged.
    pub fn from_rows(rows: &[&[[u8; 3]]], input: &str) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().copied().map(Pixel::from).collect())
            .collect();
        let grid = Grid::from_rows(rows).expect("invalid grid rows");
        Self {
            vm: Interpreter::new(grid, input),
        }
    }

    /// Create a harness from raw RGBA image bytes.
    ///
    /// # Panics
    ///
    /// Panics if the byte count does not match the dimensions.
    pub fn from_rgba(width: usize, height: usize, bytes: &[u8], input: &str) -> Self {
        let grid = Grid::from_rgba(width, height, bytes).expect("invalid RGBA image");
        Self {
            vm: Interpreter::new(grid, input),
        }
    }

    /// Start (or restart) the program from the origin.
    pub fn start(&mut self) {
        self.vm.run();
    }

    /// Execute a single step.
    ///
    /// # Panics
    ///
    /// Panics if the step raises an uncaught fault.
    pub fn step(&mut self) {
        self.vm.step().expect("Step failed");
    }

    /// Execute multiple steps.
    pub fn run_steps(&mut self, count: u64) {
        for _ in 0..count {
            self.step();
        }
    }

    /// Run from the origin until the program halts.
    ///
    /// # Panics
    ///
    /// Panics on an uncaught fault or if the program does not halt within
    /// [`DEFAULT_STEP_LIMIT`] steps.
    pub fn run_to_halt(&mut self) -> RunReport {
        match self.try_run(DEFAULT_STEP_LIMIT) {
            Ok(report) => report,
            Err(e) => panic!("Program did not halt: {e}"),
        }
    }

    /// Run from the origin, returning the driver's result.
    pub fn try_run(&mut self, max_steps: u64) -> Result<RunReport, DriveError> {
        drive(&mut self.vm, max_steps)
    }

    pub fn register(&self, index: u8) -> u8 {
        self.vm.register(index)
    }

    pub fn output(&self) -> &str {
        self.vm.output()
    }

    pub fn status(&self) -> Status {
        self.vm.status()
    }

    pub fn location(&self) -> Location {
        self.vm.location()
    }

    pub fn direction(&self) -> Direction {
        self.vm.direction()
    }

    /// Get access to the interpreter for verification.
    pub fn vm(&self) -> &Interpreter {
        &self.vm
    }
}
