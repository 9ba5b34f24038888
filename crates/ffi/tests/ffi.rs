use std::ffi::{CStr, CString, c_char};

use semaphore::{Identity, IncrementalMerkleTree, protocol::generate_proof_for_signal};
use semaphore_ffi::*;
use semaphore_test_utils::{ToyBackend, fixtures};

fn take_string(ptr: *mut c_char) -> String {
    assert!(!ptr.is_null(), "unexpected null string");
    // SAFETY: returned by the library and freed right after copying.
    let value = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_owned();
    unsafe { semaphore_free_string(ptr) };
    value
}

fn last_error() -> String {
    take_string(semaphore_last_error())
}

fn new_identity(seed: &str) -> *mut Identity {
    let identity = unsafe { semaphore_new_identity(seed.as_ptr(), seed.len()) };
    assert!(!identity.is_null());
    identity
}

#[test]
fn identity_commitment_and_nullifier_hash() {
    let alice = new_identity("alice");
    let commitment = take_string(unsafe { semaphore_identity_commitment(alice) });
    assert_eq!(
        commitment,
        "0x22ff5d7b4418769a3a768bdcd5f430f3105e0230b74580383504fcccfa5cfd83"
    );

    let topic = CString::new("topic-1").unwrap();
    let n1 = take_string(unsafe { semaphore_nullifier_hash(alice, topic.as_ptr()) });
    assert_eq!(
        n1,
        "0xb9785887a01efec24618f6d39e5dc146af704882feb2edf38d540830578606e"
    );
    let topic = CString::new("topic-2").unwrap();
    let n2 = take_string(unsafe { semaphore_nullifier_hash(alice, topic.as_ptr()) });
    assert_ne!(n1, n2);

    // The same seed gives the same identity.
    let again = new_identity("alice");
    assert_eq!(
        take_string(unsafe { semaphore_identity_commitment(again) }),
        commitment
    );

    unsafe {
        semaphore_free_identity(alice);
        semaphore_free_identity(again);
    }
}

#[test]
fn empty_seed_and_null_arguments_fail_cleanly() {
    let identity = unsafe { semaphore_new_identity(b"".as_ptr(), 0) };
    assert!(identity.is_null());
    assert_eq!(semaphore_last_error_code(), SEMAPHORE_ERROR_INPUT_MALFORMED);
    assert_eq!(last_error(), "identity seed must not be empty");

    let identity = unsafe { semaphore_new_identity(std::ptr::null(), 4) };
    assert!(identity.is_null());
    assert_eq!(last_error(), "argument `seed` is null");

    let commitment = unsafe { semaphore_identity_commitment(std::ptr::null()) };
    assert!(commitment.is_null());
    assert_eq!(semaphore_last_error_code(), SEMAPHORE_ERROR_INPUT_MALFORMED);

    // Null handles are ignored by the release functions.
    unsafe {
        semaphore_free_identity(std::ptr::null_mut());
        semaphore_free_tree(std::ptr::null_mut());
        semaphore_free_merkle_proof(std::ptr::null_mut());
        semaphore_free_proof(std::ptr::null_mut());
        semaphore_free_string(std::ptr::null_mut());
    }
}

#[test]
fn tree_lifecycle() {
    assert!(semaphore_create_tree(0).is_null());
    assert_eq!(semaphore_last_error_code(), SEMAPHORE_ERROR_INPUT_MALFORMED);
    assert!(semaphore_create_tree(33).is_null());

    let tree = semaphore_create_tree(2);
    assert!(!tree.is_null());
    assert_eq!(semaphore_last_error_code(), SEMAPHORE_ERROR_NONE);

    let alice = new_identity("alice");
    assert!(unsafe { semaphore_insert_leaf(tree, alice) });
    assert_eq!(
        take_string(unsafe { semaphore_tree_root(tree) }),
        "0x116b72d7cbc13b810c0c4760a21c1a7f7ab82e1275ebefabd93e8dbde2a4bd55"
    );

    let proof = unsafe { semaphore_merkle_proof(tree, 0) };
    assert!(!proof.is_null());
    let missing = unsafe { semaphore_merkle_proof(tree, 1) };
    assert!(missing.is_null());
    assert_eq!(semaphore_last_error_code(), SEMAPHORE_ERROR_STATE_INVALID);

    for seed in ["s1", "s2", "s3"] {
        let identity = new_identity(seed);
        assert!(unsafe { semaphore_insert_leaf(tree, identity) });
        unsafe { semaphore_free_identity(identity) };
    }
    let root = take_string(unsafe { semaphore_tree_root(tree) });

    assert!(!unsafe { semaphore_insert_leaf(tree, alice) });
    assert_eq!(semaphore_last_error_code(), SEMAPHORE_ERROR_STATE_INVALID);
    assert_eq!(last_error(), "tree is full (4 leaves)");
    assert_eq!(take_string(unsafe { semaphore_tree_root(tree) }), root);

    unsafe {
        semaphore_free_merkle_proof(proof);
        semaphore_free_identity(alice);
        semaphore_free_tree(tree);
    }
}

#[test]
fn proof_text_round_trip() {
    let mut rng = fixtures::rng(11);
    let backend = ToyBackend::setup(&mut rng);
    let alice = Identity::from_seed(b"alice").unwrap();
    let mut tree = IncrementalMerkleTree::new(3).unwrap();
    tree.insert(alice.commitment()).unwrap();
    let proof = generate_proof_for_signal(
        &alice,
        b"vote-42",
        b"hello",
        &tree.proof(0).unwrap(),
        &backend,
        &mut rng,
    )
    .unwrap();

    let text = CString::new(proof.proof.to_string()).unwrap();
    let handle = unsafe { semaphore_proof_from_string(text.as_ptr()) };
    assert!(!handle.is_null());
    assert_eq!(
        take_string(unsafe { semaphore_proof_to_string(handle) }),
        proof.proof.to_string()
    );
    unsafe { semaphore_free_proof(handle) };

    let garbage = CString::new("[[\"0x1\",\"0x3\"]]").unwrap();
    assert!(unsafe { semaphore_proof_from_string(garbage.as_ptr()) }.is_null());
    assert_eq!(semaphore_last_error_code(), SEMAPHORE_ERROR_INPUT_MALFORMED);
}

#[test]
fn verify_reports_malformed_inputs_and_missing_keys() {
    let mut rng = fixtures::rng(12);
    let backend = ToyBackend::setup(&mut rng);
    let alice = Identity::from_seed(b"alice").unwrap();
    let mut tree = IncrementalMerkleTree::new(2).unwrap();
    tree.insert(alice.commitment()).unwrap();
    let proof = generate_proof_for_signal(
        &alice,
        b"topic",
        b"signal",
        &tree.proof(0).unwrap(),
        &backend,
        &mut rng,
    )
    .unwrap();

    let text = CString::new(proof.proof.to_string()).unwrap();
    let handle = unsafe { semaphore_proof_from_string(text.as_ptr()) };
    let topic = CString::new("topic").unwrap();
    let signal = CString::new("signal").unwrap();
    let root = CString::new(proof.root.to_string()).unwrap();
    let nullifier_hash = CString::new(proof.nullifier_hash.to_string()).unwrap();
    let missing_key = CString::new("/nonexistent/verification_key.json").unwrap();

    let non_canonical = CString::new("0x00ff").unwrap();
    let result = unsafe {
        semaphore_verify_proof(
            non_canonical.as_ptr(),
            topic.as_ptr(),
            signal.as_ptr(),
            nullifier_hash.as_ptr(),
            handle,
            missing_key.as_ptr(),
        )
    };
    assert_eq!(result, 0);
    assert_eq!(semaphore_last_error_code(), SEMAPHORE_ERROR_INPUT_MALFORMED);

    let result = unsafe {
        semaphore_verify_proof(
            root.as_ptr(),
            topic.as_ptr(),
            signal.as_ptr(),
            nullifier_hash.as_ptr(),
            handle,
            missing_key.as_ptr(),
        )
    };
    assert_eq!(result, 0);
    assert_eq!(semaphore_last_error_code(), SEMAPHORE_ERROR_BACKEND_FAILURE);

    unsafe { semaphore_free_proof(handle) };
}

#[test]
fn verify_accepts_honest_proofs_and_cleanly_rejects_others() {
    let mut rng = fixtures::rng(13);
    let backend = ToyBackend::setup(&mut rng);
    let dir = std::env::temp_dir().join(format!("semaphore-ffi-vk-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let vk_path = dir.join("verification_key.json");
    std::fs::write(
        &vk_path,
        fixtures::snarkjs_verifying_key_json(backend.verifying_key().vk()),
    )
    .unwrap();

    let alice = Identity::from_seed(b"alice").unwrap();
    let mut tree = IncrementalMerkleTree::new(20).unwrap();
    tree.insert(alice.commitment()).unwrap();
    let proof = generate_proof_for_signal(
        &alice,
        b"vote-42",
        b"hello",
        &tree.proof(0).unwrap(),
        &backend,
        &mut rng,
    )
    .unwrap();

    let text = CString::new(proof.proof.to_string()).unwrap();
    let handle = unsafe { semaphore_proof_from_string(text.as_ptr()) };
    assert!(!handle.is_null());
    let root = CString::new(proof.root.to_string()).unwrap();
    let nullifier_hash = CString::new(proof.nullifier_hash.to_string()).unwrap();
    let topic = CString::new("vote-42").unwrap();
    let vk = CString::new(vk_path.to_str().unwrap()).unwrap();
    let verify = |signal: &str| {
        let signal = CString::new(signal).unwrap();
        unsafe {
            semaphore_verify_proof(
                root.as_ptr(),
                topic.as_ptr(),
                signal.as_ptr(),
                nullifier_hash.as_ptr(),
                handle,
                vk.as_ptr(),
            )
        }
    };

    assert_eq!(verify("hello"), 1);
    assert_eq!(semaphore_last_error_code(), SEMAPHORE_ERROR_NONE);
    assert!(semaphore_last_error().is_null());

    assert_eq!(verify("hellp"), 0);
    assert_eq!(semaphore_last_error_code(), SEMAPHORE_ERROR_NONE);
    assert!(semaphore_last_error().is_null());

    unsafe { semaphore_free_proof(handle) };
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn generate_proof_with_missing_artifacts_fails_cleanly() {
    let alice = new_identity("alice");
    let tree = semaphore_create_tree(20);
    assert!(unsafe { semaphore_insert_leaf(tree, alice) });
    let merkle_proof = unsafe { semaphore_merkle_proof(tree, 0) };

    let topic = CString::new("vote-42").unwrap();
    let signal = CString::new("hello").unwrap();
    let zkey = CString::new("/nonexistent/semaphore.zkey").unwrap();
    let graph = CString::new("/nonexistent/semaphore.graph").unwrap();
    let proof = unsafe {
        semaphore_generate_proof(
            alice,
            topic.as_ptr(),
            signal.as_ptr(),
            merkle_proof,
            zkey.as_ptr(),
            graph.as_ptr(),
        )
    };
    assert!(proof.is_null());
    assert_eq!(semaphore_last_error_code(), SEMAPHORE_ERROR_BACKEND_FAILURE);
    assert!(last_error().contains("/nonexistent/semaphore.zkey"));

    let proof = unsafe {
        semaphore_generate_proof(
            alice,
            std::ptr::null(),
            signal.as_ptr(),
            merkle_proof,
            zkey.as_ptr(),
            graph.as_ptr(),
        )
    };
    assert!(proof.is_null());
    assert_eq!(semaphore_last_error_code(), SEMAPHORE_ERROR_INPUT_MALFORMED);

    unsafe {
        semaphore_free_merkle_proof(merkle_proof);
        semaphore_free_tree(tree);
        semaphore_free_identity(alice);
    }
}

#[test]
#[ignore = "needs the compiled circuit artifacts"]
fn prove_verify_and_tamper_with_circuit_artifacts() {
    let config = fixtures::circuit_config().expect("SEMAPHORE_CIRCUIT_DIR is set");
    let path = |p: &std::path::Path| CString::new(p.to_str().unwrap()).unwrap();
    let (zkey, graph, vk) = (
        path(config.zkey_path()),
        path(config.graph_path()),
        path(config.verifying_key_path()),
    );

    let alice = new_identity("alice");
    let tree = semaphore_create_tree(config.tree_depth());
    assert!(unsafe { semaphore_insert_leaf(tree, alice) });
    let merkle_proof = unsafe { semaphore_merkle_proof(tree, 0) };
    let topic = CString::new("vote-42").unwrap();
    let signal = CString::new("hello").unwrap();

    let proof = unsafe {
        semaphore_generate_proof(
            alice,
            topic.as_ptr(),
            signal.as_ptr(),
            merkle_proof,
            zkey.as_ptr(),
            graph.as_ptr(),
        )
    };
    assert!(!proof.is_null(), "{}", last_error());
    let root = CString::new(take_string(unsafe { semaphore_tree_root(tree) })).unwrap();
    let nullifier_hash =
        CString::new(take_string(unsafe { semaphore_nullifier_hash(alice, topic.as_ptr()) }))
            .unwrap();
    let verify = |proof: *const semaphore::Groth16Proof| unsafe {
        semaphore_verify_proof(
            root.as_ptr(),
            topic.as_ptr(),
            signal.as_ptr(),
            nullifier_hash.as_ptr(),
            proof,
            vk.as_ptr(),
        )
    };
    assert_eq!(verify(proof), 1);

    // Flip the last hex digit of each coordinate of the text form.
    let text = take_string(unsafe { semaphore_proof_to_string(proof) });
    for (position, _) in text.match_indices('"').skip(1).step_by(2) {
        let mut tampered = text.clone().into_bytes();
        let digit = tampered[position - 1];
        tampered[position - 1] = if digit == b'0' { b'1' } else { b'0' };
        let tampered = CString::new(tampered).unwrap();
        let handle = unsafe { semaphore_proof_from_string(tampered.as_ptr()) };
        if handle.is_null() {
            continue;
        }
        assert_eq!(verify(handle), 0);
        assert_eq!(semaphore_last_error_code(), SEMAPHORE_ERROR_NONE);
        unsafe { semaphore_free_proof(handle) };
    }

    unsafe {
        semaphore_free_proof(proof);
        semaphore_free_merkle_proof(merkle_proof);
        semaphore_free_tree(tree);
        semaphore_free_identity(alice);
    }
}
