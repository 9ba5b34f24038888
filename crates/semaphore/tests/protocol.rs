use ark_bn254::Bn254;
use ark_groth16::Proof;
use semaphore::{
    ErrorKind, FieldElement, Groth16Proof, Identity, IncrementalMerkleTree, MerkleProof,
    PackedProof, SemaphoreError, authentication, generate_proof, hash_to_field,
    protocol::{generate_proof_for_signal, verify_proof_for_signal},
    verify_proof,
};
use semaphore_test_utils::{FailingBackend, MismatchedBackend, ToyBackend, fixtures};

struct Group {
    members: Vec<Identity>,
    tree: IncrementalMerkleTree,
}

fn group(depth: usize) -> Group {
    let members: Vec<Identity> = fixtures::SEEDS
        .iter()
        .map(|seed| Identity::from_seed(seed.as_bytes()).unwrap())
        .collect();
    let mut tree = IncrementalMerkleTree::new(depth).unwrap();
    for member in &members {
        tree.insert(member.commitment()).unwrap();
    }
    Group { members, tree }
}

#[test]
fn prove_and_verify_membership() {
    let mut rng = fixtures::rng(1);
    let backend = ToyBackend::setup(&mut rng);
    let Group { members, tree } = group(20);

    let proof = generate_proof_for_signal(
        &members[2],
        b"vote-42",
        b"hello",
        &tree.proof(2).unwrap(),
        &backend,
        &mut rng,
    )
    .unwrap();

    assert_eq!(proof.root, tree.root());
    assert_eq!(proof.signal_hash, hash_to_field(b"hello"));
    assert_eq!(proof.external_nullifier, hash_to_field(b"vote-42"));
    assert_eq!(
        proof.nullifier_hash,
        members[2].nullifier_hash(hash_to_field(b"vote-42"))
    );

    assert!(
        verify_proof_for_signal(
            tree.root(),
            proof.nullifier_hash,
            b"hello",
            b"vote-42",
            &proof.proof,
            &backend,
        )
        .unwrap()
    );
    assert!(proof.verify(&backend).unwrap());
    assert!(proof.verify(&backend.verifying_key()).unwrap());
}

#[test]
fn single_member_at_default_depth() {
    let mut rng = fixtures::rng(2);
    let backend = ToyBackend::setup(&mut rng);
    let alice = Identity::from_seed(b"alice").unwrap();
    let mut tree = IncrementalMerkleTree::new(20).unwrap();
    let index = tree.insert(alice.commitment()).unwrap();

    let proof = generate_proof_for_signal(
        &alice,
        b"vote-42",
        b"hello",
        &tree.proof(index).unwrap(),
        &backend,
        &mut rng,
    )
    .unwrap();
    assert!(
        verify_proof_for_signal(
            tree.root(),
            proof.nullifier_hash,
            b"hello",
            b"vote-42",
            &proof.proof,
            &backend.verifying_key(),
        )
        .unwrap()
    );
}

#[test]
fn wrong_public_signals_are_rejected() {
    let mut rng = fixtures::rng(3);
    let backend = ToyBackend::setup(&mut rng);
    let Group { members, tree } = group(3);
    let proof = generate_proof_for_signal(
        &members[0],
        b"topic",
        b"signal",
        &tree.proof(0).unwrap(),
        &backend,
        &mut rng,
    )
    .unwrap();
    let one = FieldElement::ONE;

    let cases = [
        (proof.root + one, proof.nullifier_hash, proof.signal_hash, proof.external_nullifier),
        (proof.root, proof.nullifier_hash + one, proof.signal_hash, proof.external_nullifier),
        (proof.root, proof.nullifier_hash, hash_to_field(b"other"), proof.external_nullifier),
        (proof.root, proof.nullifier_hash, proof.signal_hash, hash_to_field(b"other")),
    ];
    for (root, nullifier_hash, signal_hash, external_nullifier) in cases {
        assert!(
            !verify_proof(
                root,
                nullifier_hash,
                signal_hash,
                external_nullifier,
                &proof.proof,
                &backend
            )
            .unwrap()
        );
    }
}

#[test]
fn tampered_proofs_are_rejected_without_error() {
    let mut rng = fixtures::rng(4);
    let backend = ToyBackend::setup(&mut rng);
    let Group { members, tree } = group(3);
    let proof = generate_proof_for_signal(
        &members[1],
        b"topic",
        b"signal",
        &tree.proof(1).unwrap(),
        &backend,
        &mut rng,
    )
    .unwrap();
    let inner: Proof<Bn254> = proof.proof.clone().into();

    let mut negated = inner.clone();
    negated.a = -negated.a;
    let mut swapped = inner.clone();
    std::mem::swap(&mut swapped.a, &mut swapped.c);
    for tampered in [negated, swapped] {
        let tampered = Groth16Proof::from(tampered);
        assert!(
            !verify_proof(
                proof.root,
                proof.nullifier_hash,
                proof.signal_hash,
                proof.external_nullifier,
                &tampered,
                &backend,
            )
            .unwrap()
        );
    }

    // Flipping a byte of the packed form either breaks the encoding or yields a proof that
    // does not verify.
    let packed = proof.proof.pack();
    for position in (0..256).step_by(13) {
        let mut bytes = packed.0;
        bytes[position] ^= 0x01;
        let Ok(tampered) = PackedProof(bytes).unpack() else {
            continue;
        };
        assert!(
            !verify_proof(
                proof.root,
                proof.nullifier_hash,
                proof.signal_hash,
                proof.external_nullifier,
                &tampered,
                &backend,
            )
            .unwrap(),
            "byte {position}"
        );
    }
}

#[test]
fn proof_text_survives_the_boundary() {
    let mut rng = fixtures::rng(5);
    let backend = ToyBackend::setup(&mut rng);
    let Group { members, tree } = group(2);
    let proof = generate_proof_for_signal(
        &members[3],
        b"topic",
        b"signal",
        &tree.proof(3).unwrap(),
        &backend,
        &mut rng,
    )
    .unwrap();

    let text = proof.proof.to_string();
    let parsed: Groth16Proof = text.parse().unwrap();
    assert_eq!(parsed, proof.proof);
    let unpacked = proof.proof.pack().unpack().unwrap();
    assert_eq!(unpacked, proof.proof);

    let json = serde_json::to_string(&proof).unwrap();
    let restored: semaphore::SemaphoreProof = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, proof);
    assert!(restored.verify(&backend).unwrap());
}

#[test]
fn proof_for_another_tree_does_not_verify_against_this_root() {
    let mut rng = fixtures::rng(6);
    let backend = ToyBackend::setup(&mut rng);
    let Group { members, tree } = group(3);
    let mut other = tree.clone();
    other.insert(FieldElement::from(99u64)).unwrap();

    let proof = generate_proof(
        &members[0],
        FieldElement::from(7u64),
        FieldElement::from(8u64),
        &tree.proof(0).unwrap(),
        &backend,
        &mut rng,
    )
    .unwrap();
    assert!(
        !verify_proof(
            other.root(),
            proof.nullifier_hash,
            proof.signal_hash,
            proof.external_nullifier,
            &proof.proof,
            &backend,
        )
        .unwrap()
    );
}

#[test]
fn backend_with_foreign_key_is_a_backend_failure() {
    let mut rng = fixtures::rng(7);
    let backend = MismatchedBackend(ToyBackend::setup(&mut rng));
    let Group { members, tree } = group(2);
    let err = generate_proof_for_signal(
        &members[0],
        b"topic",
        b"signal",
        &tree.proof(0).unwrap(),
        &backend,
        &mut rng,
    )
    .unwrap_err();
    assert!(matches!(err, SemaphoreError::PublicSignalsMismatch));
    assert_eq!(err.kind(), ErrorKind::BackendFailure);

    let err = generate_proof_for_signal(
        &members[0],
        b"topic",
        b"signal",
        &tree.proof(0).unwrap(),
        &FailingBackend,
        &mut rng,
    )
    .unwrap_err();
    assert!(matches!(err, SemaphoreError::Proof(_)));
    assert_eq!(err.kind(), ErrorKind::BackendFailure);
}

#[test]
fn malformed_merkle_proofs_are_rejected_before_proving() {
    let mut rng = fixtures::rng(8);
    let Group { members, tree } = group(3);

    let mut inconsistent = tree.proof(1).unwrap();
    inconsistent.leaf_index = 2;
    let err = generate_proof(
        &members[1],
        FieldElement::ONE,
        FieldElement::ONE,
        &inconsistent,
        &FailingBackend,
        &mut rng,
    )
    .unwrap_err();
    assert!(matches!(err, SemaphoreError::InvalidMerkleProof(_)));
    assert_eq!(err.kind(), ErrorKind::InputMalformed);

    let err = generate_proof(
        &members[1],
        FieldElement::ONE,
        FieldElement::ONE,
        &MerkleProof::new(0, Vec::new()),
        &FailingBackend,
        &mut rng,
    )
    .unwrap_err();
    assert!(matches!(err, SemaphoreError::InvalidDepth { depth: 0, .. }));
}

#[test]
fn authentication_round_trip() {
    let mut rng = fixtures::rng(9);
    let backend = ToyBackend::setup(&mut rng);
    let alice = Identity::from_seed(b"alice").unwrap();
    let (external_nullifier, signal_hash) = (hash_to_field(b"login"), hash_to_field(b"nonce"));

    let proof =
        authentication::generate_proof(16, &alice, external_nullifier, signal_hash, &backend, &mut rng)
            .unwrap();
    assert!(
        authentication::verify_proof(
            16,
            alice.commitment(),
            proof.nullifier_hash,
            signal_hash,
            external_nullifier,
            &proof.proof,
            &backend,
        )
        .unwrap()
    );

    let bob = Identity::from_seed(b"bob").unwrap();
    assert!(
        !authentication::verify_proof(
            16,
            bob.commitment(),
            proof.nullifier_hash,
            signal_hash,
            external_nullifier,
            &proof.proof,
            &backend,
        )
        .unwrap()
    );
    assert!(matches!(
        authentication::generate_proof(0, &alice, external_nullifier, signal_hash, &backend, &mut rng),
        Err(SemaphoreError::InvalidDepth { .. })
    ));
}
