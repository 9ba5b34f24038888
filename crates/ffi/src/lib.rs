//! C ABI for the Semaphore protocol.
//!
//! Identities, trees, Merkle proofs and Groth16 proofs cross the boundary as opaque handles
//! owned by the caller, and every handle has a matching `semaphore_free_*` function. Strings
//! returned by this library are NUL-terminated, heap allocated and released with
//! [`semaphore_free_string`].
//!
//! A call that fails returns a null pointer, `false` or `0` and records the reason for the
//! calling thread, see [`semaphore_last_error`] and [`semaphore_last_error_code`]. Successful
//! calls clear the record. No call unwinds into the caller.
//!
//! The declarations live in `include/semaphore.h`.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(missing_docs)]

use std::ffi::{CStr, CString, c_char, c_int};

use semaphore::{
    FieldElement, Groth16Proof, Identity, IncrementalMerkleTree, MerkleProof, hash_to_field,
    protocol::{generate_proof_for_signal, verify_proof_for_signal},
};
use semaphore_proof::{SemaphoreVerifyingKey, load_material_from_paths};
use zeroize::Zeroize;

mod error;

use error::{FfiError, guard};
pub use error::{
    SEMAPHORE_ERROR_BACKEND_FAILURE, SEMAPHORE_ERROR_INPUT_MALFORMED, SEMAPHORE_ERROR_NONE,
    SEMAPHORE_ERROR_STATE_INVALID,
};

/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn c_bytes<'a>(ptr: *const c_char, name: &'static str) -> Result<&'a [u8], FfiError> {
    if ptr.is_null() {
        return Err(FfiError::NullPointer(name));
    }
    // SAFETY: non-null and NUL-terminated per the contract above.
    Ok(unsafe { CStr::from_ptr(ptr) }.to_bytes())
}

/// # Safety
/// See [`c_bytes`].
unsafe fn c_str<'a>(ptr: *const c_char, name: &'static str) -> Result<&'a str, FfiError> {
    // SAFETY: forwarded contract.
    let bytes = unsafe { c_bytes(ptr, name) }?;
    std::str::from_utf8(bytes).map_err(|_| FfiError::InvalidUtf8(name))
}

/// # Safety
/// `ptr` must be null or a live handle of type `T` returned by this library.
unsafe fn handle<'a, T>(ptr: *const T, name: &'static str) -> Result<&'a T, FfiError> {
    // SAFETY: a non-null handle points to a live `T` per the contract above.
    unsafe { ptr.as_ref() }.ok_or(FfiError::NullPointer(name))
}

/// # Safety
/// See [`handle`]; additionally no other reference to the handle may be live.
unsafe fn handle_mut<'a, T>(ptr: *mut T, name: &'static str) -> Result<&'a mut T, FfiError> {
    // SAFETY: see above.
    unsafe { ptr.as_mut() }.ok_or(FfiError::NullPointer(name))
}

fn into_handle<T>(value: T) -> *mut T {
    Box::into_raw(Box::new(value))
}

fn into_c_string(value: impl ToString) -> Result<*mut c_char, FfiError> {
    CString::new(value.to_string())
        .map(CString::into_raw)
        .map_err(|_| FfiError::InteriorNul)
}

/// # Safety
/// `ptr` must be null or a handle returned by this library that has not been freed.
unsafe fn free_handle<T>(function: &'static str, ptr: *mut T) {
    if ptr.is_null() {
        return;
    }
    guard(function, (), || {
        // SAFETY: the handle was created by `into_handle` and is released exactly once.
        drop(unsafe { Box::from_raw(ptr) });
        Ok(())
    });
}

/// Creates an identity from `seed_len` bytes at `seed`.
///
/// Returns null if the seed is empty or `seed` is null.
///
/// # Safety
/// `seed` must point to `seed_len` readable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn semaphore_new_identity(seed: *const u8, seed_len: usize) -> *mut Identity {
    guard("semaphore_new_identity", std::ptr::null_mut(), || {
        if seed.is_null() {
            return Err(FfiError::NullPointer("seed"));
        }
        // SAFETY: `seed` points to `seed_len` readable bytes per the contract.
        let seed = unsafe { std::slice::from_raw_parts(seed, seed_len) };
        Ok(into_handle(Identity::from_seed(seed)?))
    })
}

/// Returns the identity commitment as canonical text.
///
/// # Safety
/// `identity` must be a live identity handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn semaphore_identity_commitment(identity: *const Identity) -> *mut c_char {
    guard("semaphore_identity_commitment", std::ptr::null_mut(), || {
        // SAFETY: forwarded contract.
        let identity = unsafe { handle(identity, "identity") }?;
        into_c_string(identity.commitment())
    })
}

/// Returns the nullifier hash of `identity` for the topic `external_nullifier` as canonical
/// text. The topic is hashed into the field.
///
/// # Safety
/// `identity` must be a live identity handle and `external_nullifier` a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn semaphore_nullifier_hash(
    identity: *const Identity,
    external_nullifier: *const c_char,
) -> *mut c_char {
    guard("semaphore_nullifier_hash", std::ptr::null_mut(), || {
        // SAFETY: forwarded contract.
        let identity = unsafe { handle(identity, "identity") }?;
        // SAFETY: forwarded contract.
        let topic = unsafe { c_bytes(external_nullifier, "external_nullifier") }?;
        into_c_string(identity.nullifier_hash(hash_to_field(topic)))
    })
}

/// Creates an empty tree of the given depth.
///
/// Returns null if the depth is unsupported.
#[unsafe(no_mangle)]
pub extern "C" fn semaphore_create_tree(depth: usize) -> *mut IncrementalMerkleTree {
    guard("semaphore_create_tree", std::ptr::null_mut(), || {
        Ok(into_handle(IncrementalMerkleTree::new(depth)?))
    })
}

/// Inserts the commitment of `identity` as the next leaf of `tree`.
///
/// Returns `false` if the tree is full; the tree is then unchanged.
///
/// # Safety
/// `tree` must be a live tree handle not used concurrently and `identity` a live identity
/// handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn semaphore_insert_leaf(
    tree: *mut IncrementalMerkleTree,
    identity: *const Identity,
) -> bool {
    guard("semaphore_insert_leaf", false, || {
        // SAFETY: forwarded contract.
        let tree = unsafe { handle_mut(tree, "tree") }?;
        // SAFETY: forwarded contract.
        let identity = unsafe { handle(identity, "identity") }?;
        tree.insert(identity.commitment())?;
        Ok(true)
    })
}

/// Returns the root of `tree` as canonical text.
///
/// # Safety
/// `tree` must be a live tree handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn semaphore_tree_root(tree: *const IncrementalMerkleTree) -> *mut c_char {
    guard("semaphore_tree_root", std::ptr::null_mut(), || {
        // SAFETY: forwarded contract.
        let tree = unsafe { handle(tree, "tree") }?;
        into_c_string(tree.root())
    })
}

/// Returns the Merkle proof of the leaf at `leaf_index`.
///
/// Returns null if the leaf has not been inserted.
///
/// # Safety
/// `tree` must be a live tree handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn semaphore_merkle_proof(
    tree: *const IncrementalMerkleTree,
    leaf_index: u64,
) -> *mut MerkleProof {
    guard("semaphore_merkle_proof", std::ptr::null_mut(), || {
        // SAFETY: forwarded contract.
        let tree = unsafe { handle(tree, "tree") }?;
        Ok(into_handle(tree.proof(leaf_index)?))
    })
}

/// Proves that `identity` is the member at `merkle_proof` and binds the proof to `signal` and
/// `external_nullifier`.
///
/// The proving key and the witness graph are loaded from `zkey_path` and `graph_path` for this
/// call. Returns null on malformed input or if the backend fails.
///
/// # Safety
/// `identity` and `merkle_proof` must be live handles and the remaining arguments
/// NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn semaphore_generate_proof(
    identity: *const Identity,
    external_nullifier: *const c_char,
    signal: *const c_char,
    merkle_proof: *const MerkleProof,
    zkey_path: *const c_char,
    graph_path: *const c_char,
) -> *mut Groth16Proof {
    guard("semaphore_generate_proof", std::ptr::null_mut(), || {
        // SAFETY: forwarded contract for all arguments.
        let (identity, external_nullifier, signal, merkle_proof, zkey_path, graph_path) = unsafe {
            (
                handle(identity, "identity")?,
                c_bytes(external_nullifier, "external_nullifier")?,
                c_bytes(signal, "signal")?,
                handle(merkle_proof, "merkle_proof")?,
                c_str(zkey_path, "zkey_path")?,
                c_str(graph_path, "graph_path")?,
            )
        };
        let material = load_material_from_paths(zkey_path, graph_path)?;
        let proof = generate_proof_for_signal(
            identity,
            external_nullifier,
            signal,
            merkle_proof,
            &material,
            &mut rand::thread_rng(),
        )?;
        Ok(into_handle(proof.proof))
    })
}

/// Renders `proof` in its text form.
///
/// # Safety
/// `proof` must be a live proof handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn semaphore_proof_to_string(proof: *const Groth16Proof) -> *mut c_char {
    guard("semaphore_proof_to_string", std::ptr::null_mut(), || {
        // SAFETY: forwarded contract.
        let proof = unsafe { handle(proof, "proof") }?;
        into_c_string(proof)
    })
}

/// Parses a proof from its text form.
///
/// Returns null if the text is not a canonical encoding of valid curve points.
///
/// # Safety
/// `text` must be a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn semaphore_proof_from_string(text: *const c_char) -> *mut Groth16Proof {
    guard("semaphore_proof_from_string", std::ptr::null_mut(), || {
        // SAFETY: forwarded contract.
        let text = unsafe { c_str(text, "text") }?;
        Ok(into_handle(text.parse::<Groth16Proof>()?))
    })
}

/// Verifies `proof` for the given public values with the snarkjs verifying key at
/// `verifying_key_path`.
///
/// Returns `1` if the proof is valid and `0` otherwise. A proof that does not verify leaves no
/// error record; malformed input or an unusable key does.
///
/// # Safety
/// `proof` must be a live proof handle and the remaining arguments NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn semaphore_verify_proof(
    root: *const c_char,
    external_nullifier: *const c_char,
    signal: *const c_char,
    nullifier_hash: *const c_char,
    proof: *const Groth16Proof,
    verifying_key_path: *const c_char,
) -> c_int {
    guard("semaphore_verify_proof", 0, || {
        // SAFETY: forwarded contract for all arguments.
        let (root, external_nullifier, signal, nullifier_hash, proof, verifying_key_path) = unsafe {
            (
                c_str(root, "root")?,
                c_bytes(external_nullifier, "external_nullifier")?,
                c_bytes(signal, "signal")?,
                c_str(nullifier_hash, "nullifier_hash")?,
                handle(proof, "proof")?,
                c_str(verifying_key_path, "verifying_key_path")?,
            )
        };
        let root: FieldElement = root.parse()?;
        let nullifier_hash: FieldElement = nullifier_hash.parse()?;
        let verifying_key = SemaphoreVerifyingKey::from_path(verifying_key_path)?;
        let valid = verify_proof_for_signal(
            root,
            nullifier_hash,
            signal,
            external_nullifier,
            proof,
            &verifying_key,
        )?;
        Ok(c_int::from(valid))
    })
}

/// Returns the message of the last error on this thread, or null. Free it with
/// [`semaphore_free_string`].
#[unsafe(no_mangle)]
pub extern "C" fn semaphore_last_error() -> *mut c_char {
    error::last_error_message()
}

/// Returns the category of the last error on this thread, one of the `SEMAPHORE_ERROR_*`
/// constants.
#[unsafe(no_mangle)]
pub extern "C" fn semaphore_last_error_code() -> c_int {
    error::last_error_code()
}

/// Releases an identity and wipes its secrets. Null is ignored.
///
/// # Safety
/// `identity` must be null or a live identity handle, and must not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn semaphore_free_identity(identity: *mut Identity) {
    // SAFETY: forwarded contract.
    unsafe { free_handle("semaphore_free_identity", identity) };
}

/// Releases a tree. Null is ignored.
///
/// # Safety
/// `tree` must be null or a live tree handle, and must not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn semaphore_free_tree(tree: *mut IncrementalMerkleTree) {
    // SAFETY: forwarded contract.
    unsafe { free_handle("semaphore_free_tree", tree) };
}

/// Releases a Merkle proof and wipes its path. Null is ignored.
///
/// # Safety
/// `merkle_proof` must be null or a live Merkle proof handle, and must not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn semaphore_free_merkle_proof(merkle_proof: *mut MerkleProof) {
    if merkle_proof.is_null() {
        return;
    }
    guard("semaphore_free_merkle_proof", (), || {
        // SAFETY: the handle was created by `into_handle` and is released exactly once.
        let mut merkle_proof = unsafe { Box::from_raw(merkle_proof) };
        merkle_proof.zeroize();
        Ok(())
    });
}

/// Releases a proof. Null is ignored.
///
/// # Safety
/// `proof` must be null or a live proof handle, and must not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn semaphore_free_proof(proof: *mut Groth16Proof) {
    // SAFETY: forwarded contract.
    unsafe { free_handle("semaphore_free_proof", proof) };
}

/// Releases a string returned by this library and wipes its contents. Null is ignored.
///
/// # Safety
/// `string` must be null or a string returned by this library, and must not be used
/// afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn semaphore_free_string(string: *mut c_char) {
    if string.is_null() {
        return;
    }
    guard("semaphore_free_string", (), || {
        // SAFETY: the string was created by `CString::into_raw` and is released exactly once.
        let mut bytes = unsafe { CString::from_raw(string) }.into_bytes();
        bytes.zeroize();
        Ok(())
    });
}
