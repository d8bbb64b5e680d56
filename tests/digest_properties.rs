use std::io;

use synhash::{block_count, digest, hamming_distance, Digest, Error, Hasher};

const HELLO_1: &str = "a5031d605094d17e3c084fb444398c54dd2b4d13d995c2833dcd300b34e96081";
const HELLO_2: &str = "256fe186d7ccc5cfd10b48d0409ea04d037a535fe15e7f97344e3f84637c06b8";
const EMPTY: &str = "7d81bc06988293b549f0f7607044d93296ffeaffaaf9dfef82ca3f40841dae6f";

fn sample_messages() -> Vec<Vec<u8>> {
    let mut messages: Vec<Vec<u8>> = vec![
        b"".to_vec(),
        b"a".to_vec(),
        b"abc".to_vec(),
        b"hello, world 1".to_vec(),
        (0..=255u8).collect(),
    ];
    for len in [7, 8, 9, 31, 32, 33, 63, 64, 65] {
        messages.push((0..len).map(|i| (i * 37 + 11) as u8).collect());
    }
    messages
}

#[test]
fn golden_vectors() {
    assert_eq!(digest(b"hello, world 1"), HELLO_1);
    assert_eq!(digest(b"hello, world 2"), HELLO_2);
    assert_eq!(hamming_distance(HELLO_1, HELLO_2), Ok(118));
    assert_eq!(
        digest(b"abc"),
        "1913a8bb1dbef1b0f7383b46d1c130f9eb4952bc47fec2bc24ce7f1721d85316"
    );
    assert_eq!(
        digest(&(0..100u8).collect::<Vec<u8>>()),
        "7bb3b7a9233943c937e41dc004fe2a4d08009448ab7c4e0093881d19e2f94d57"
    );
}

#[test]
fn empty_message() {
    assert_eq!(digest(b""), EMPTY);
    assert_ne!(digest(b""), "0".repeat(64));
}

#[test]
fn deterministic_and_fixed_width() {
    for message in sample_messages() {
        let d = digest(&message);
        assert_eq!(d, digest(&message));
        assert_eq!(d.len(), 64);
        assert!(d.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }
}

#[test]
fn earlier_digests_do_not_leak_into_later_ones() {
    let before = digest(b"hello, world 1");
    for message in sample_messages() {
        digest(&message);
    }
    assert_eq!(digest(b"hello, world 1"), before);
}

#[test]
fn block_boundaries() {
    assert_eq!(block_count(31), 1);
    assert_eq!(block_count(32), 1);
    assert_eq!(block_count(33), 2);

    let a = vec![b'a'; 33];
    assert_eq!(
        digest(&a[..31]),
        "5c9780afdcba5b484bd0426dd99b865e3b50dba5735ecad29ece9be160c2ffa7"
    );
    assert_eq!(
        digest(&a[..32]),
        "698abd19e0fed2c0eea08deba32a39a2f84d5806d0abb702bb993af6c023ae9e"
    );
    assert_eq!(
        digest(&a),
        "d8bec584cb9956ef7d6afa02287d024c5e20104057dd727a2c3f739ffd821329"
    );
}

#[test]
fn single_bit_flips_change_the_digest() {
    for message in sample_messages().into_iter().filter(|m| !m.is_empty() && m.len() <= 33) {
        let original = digest(&message);
        let mut changed = 0;
        for bit in 0..(message.len() * 8) {
            let mut flipped = message.clone();
            flipped[bit / 8] ^= 1 << (bit % 8);
            if hamming_distance(&original, &digest(&flipped)).unwrap() > 0 {
                changed += 1;
            }
        }
        assert!(changed > 0, "no flip changed the digest of {:?}", message);
    }
}

#[test]
fn distance_properties() {
    let digests: Vec<String> = sample_messages().iter().map(|m| digest(m)).collect();
    for a in digests.iter() {
        assert_eq!(hamming_distance(a, a), Ok(0));
        for b in digests.iter() {
            let ab = hamming_distance(a, b).unwrap();
            assert_eq!(Ok(ab), hamming_distance(b, a));
            assert!(ab <= 256);
        }
    }
}

#[test]
fn malformed_digests_are_rejected() {
    assert!(matches!(
        hamming_distance("xyz", HELLO_1),
        Err(Error::MalformedDigest { .. })
    ));
    assert!(matches!(
        hamming_distance(HELLO_1, &HELLO_2[..48]),
        Err(Error::MalformedDigest { .. })
    ));
    assert!(matches!(
        hamming_distance(HELLO_1, &HELLO_2.replace('a', "z")),
        Err(Error::MalformedDigest { .. })
    ));
    assert!(matches!(
        hamming_distance(&format!("{} ", &HELLO_1[..63]), HELLO_2),
        Err(Error::MalformedDigest { .. })
    ));
}

#[test]
fn parsed_digests_compare_like_text() {
    let a: Digest = HELLO_1.parse().unwrap();
    let b: Digest = HELLO_2.parse().unwrap();
    assert_eq!(a, Digest::of(b"hello, world 1"));
    assert_eq!(a.hamming_distance(&b), 118);
    assert_eq!(a.to_string(), HELLO_1);
}

#[test]
fn streaming_matches_one_shot() {
    let message: Vec<u8> = (0..200u32).map(|i| (i * 7) as u8).collect();

    let mut hasher = Hasher::new();
    for chunk in message.chunks(5) {
        hasher.update(chunk);
    }
    assert_eq!(hasher.finalize(), Digest::of(&message));

    let mut hasher = Hasher::new();
    io::copy(&mut &message[..], &mut hasher).unwrap();
    assert_eq!(hasher.finalize(), Digest::of(&message));

    assert_eq!(Hasher::new().finalize().to_hex(), EMPTY);
}

#[test]
fn concurrent_digests_are_independent() {
    let messages = sample_messages();
    let expected: Vec<String> = messages.iter().map(|m| digest(m)).collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    (0..50)
                        .flat_map(|_| messages.iter().map(|m| digest(m)))
                        .collect::<Vec<String>>()
                })
            })
            .collect();

        for handle in handles {
            let results = handle.join().unwrap();
            for (i, result) in results.iter().enumerate() {
                assert_eq!(result, &expected[i % messages.len()]);
            }
        }
    });
}
