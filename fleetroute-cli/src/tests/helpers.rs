//! Test helpers for writing CSV datasets into temporary directories.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

pub(super) const CLIENTS_CSV: &str = "ClientID,Demand,Longitude,Latitude\n\
                                      C1,4,-74.07,4.61\n\
                                      C2,6,-74.06,4.60\n";
pub(super) const DEPOTS_CSV: &str = "DepotID,Longitude,Latitude\nD1,-74.08,4.60\n";
pub(super) const VEHICLES_CSV: &str = "VehicleID,Capacity,Range\nV1,10,50\nV2,10,50\n";

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

/// A temporary directory holding the three default input files.
#[derive(Debug)]
pub(super) struct DataDir {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

impl DataDir {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        Self { _tmp: tmp, root }
    }

    pub(super) fn with_default_files() -> Self {
        let dir = Self::new();
        dir.write("clients.csv", CLIENTS_CSV);
        dir.write("depots.csv", DEPOTS_CSV);
        dir.write("vehicles.csv", VEHICLES_CSV);
        dir
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) {
        write_utf8(&self.path(name), contents.as_bytes());
    }

    pub(super) fn remove(&self, name: &str) {
        std::fs::remove_file(self.path(name).as_std_path()).expect("remove test file");
    }

    pub(super) fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path(name).as_std_path()).expect("read test file")
    }
}
