//! Shared utilities for integration tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use torsrv::system::{AccountManager, PasswordHasher};
use torsrv::Result;

/// Hasher that prefixes the plaintext instead of calling tor.
#[derive(Default)]
pub struct FakeHasher {
    pub calls: RefCell<Vec<String>>,
}

impl PasswordHasher for FakeHasher {
    fn hash(&self, plaintext: &str) -> Result<String> {
        self.calls.borrow_mut().push(plaintext.to_string());
        Ok(format!("16:FAKE{}", plaintext.len()))
    }
}

/// A collaborator call recorded by [`RecordingAccounts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountCall {
    SetUid(String, u32),
    SetGid(String, u32),
    Chown(String, PathBuf),
}

/// Account manager that records calls instead of running system tools.
#[derive(Default)]
pub struct RecordingAccounts {
    pub calls: RefCell<Vec<AccountCall>>,
}

impl AccountManager for RecordingAccounts {
    fn set_uid(&self, account: &str, uid: u32) -> Result<()> {
        self.calls.borrow_mut().push(AccountCall::SetUid(account.into(), uid));
        Ok(())
    }

    fn set_gid(&self, account: &str, gid: u32) -> Result<()> {
        self.calls.borrow_mut().push(AccountCall::SetGid(account.into(), gid));
        Ok(())
    }

    fn chown_recursive(&self, account: &str, path: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(AccountCall::Chown(account.into(), path.to_path_buf()));
        Ok(())
    }
}

/// Build an in-memory environment.
pub fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
