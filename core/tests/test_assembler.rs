// Reassembly behaviour of `Assembler::process` / `try_get_file`.
//
// Covers:
// * order independence
// * duplicate invariance
// * corruption containment and recovery
// * generation resets on chunk_size / correction_level change
// * whole-file checksum failure and retry
// * completed-file persistence

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use optic_core::{
        headers::{decode_metadata, encode_metadata},
        packet::{CorrectionLevel, Packet},
        transfer::{build_packets, Assembler, CompletedFileStore, Encoder, PacketStatus, SessionState},
        config::EncoderConfig,
        utils::crc32,
    };

    fn content(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    fn feed(asm: &mut Assembler, packets: &[Packet]) -> Vec<PacketStatus> {
        packets.iter().map(|p| asm.process(p).status).collect()
    }

// # ✅ 1. Happy path

    #[test]
    fn in_order_round_trip() {
        let blob = content(1000);
        let packets = build_packets(0, "blob.bin", &blob, 100, CorrectionLevel::M).unwrap();
        assert_eq!(packets.len(), 11);

        let mut asm = Assembler::new();
        let mut completed = Vec::new();
        for p in &packets {
            let res = asm.process(p);
            assert_eq!(res.status, PacketStatus::Accepted);
            if let Some(file) = res.completed {
                completed.push(file);
            }
        }

        assert_eq!(completed.len(), 1);
        let file = &completed[0];
        assert_eq!(file.data, Bytes::from(blob.clone()));
        assert_eq!(file.file_name, "blob.bin");
        assert_eq!(file.file_checksum, crc32(&blob));

        let stored = asm.try_get_file(packets[0].file_id()).unwrap();
        assert_eq!(stored.data, file.data);
    }

    #[test]
    fn completion_is_reported_on_the_last_packet_only() {
        let packets = build_packets(0, "f", &content(30), 10, CorrectionLevel::L).unwrap();
        let mut asm = Assembler::new();
        for (n, p) in packets.iter().enumerate() {
            let res = asm.process(p);
            assert_eq!(res.is_complete(), n == packets.len() - 1);
        }
    }

    #[test]
    fn reverse_order_completes_on_metadata() {
        let blob = content(257);
        let mut packets = build_packets(5, "rev.dat", &blob, 16, CorrectionLevel::Q).unwrap();
        packets.reverse();

        let mut asm = Assembler::new();
        let mut last = None;
        for p in &packets {
            last = Some(asm.process(p));
        }
        let last = last.unwrap();
        assert!(last.snapshot.is_complete());
        assert_eq!(last.completed.unwrap().data, Bytes::from(blob));
    }

    #[test]
    fn progress_tracks_received_bytes() {
        let packets = build_packets(0, "p", &content(40), 10, CorrectionLevel::M).unwrap();
        let mut asm = Assembler::new();

        let snap = asm.process(&packets[1]).snapshot;
        assert_eq!(snap.state, SessionState::NoMetadata);
        assert_eq!(snap.received_bytes, 10);
        assert_eq!(snap.progress(), Some(0.25));

        let snap = asm.process(&packets[0]).snapshot;
        assert_eq!(snap.state, SessionState::Accumulating);
        assert_eq!(snap.file_name.as_deref(), Some("p"));
        assert_eq!(snap.received_chunks, 2);
        assert_eq!(snap.received_bytes, 10);
    }

// # ✅ 2. Duplicates

    #[test]
    fn duplicates_do_not_change_state() {
        let packets = build_packets(0, "dup", &content(50), 20, CorrectionLevel::M).unwrap();
        let mut asm = Assembler::new();

        let first = asm.process(&packets[1]);
        let again = asm.process(&packets[1]);
        assert_eq!(first.status, PacketStatus::Accepted);
        assert_eq!(again.status, PacketStatus::Duplicate);
        assert!(!again.status.is_rejection());
        assert_eq!(first.snapshot, again.snapshot);

        asm.process(&packets[0]);
        assert_eq!(asm.process(&packets[0]).status, PacketStatus::Duplicate);
    }

    #[test]
    fn data_at_offset_zero_is_not_a_metadata_duplicate() {
        let packets = build_packets(0, "zero", &content(8), 4, CorrectionLevel::M).unwrap();
        let mut asm = Assembler::new();
        assert_eq!(asm.process(&packets[0]).status, PacketStatus::Accepted);
        assert_eq!(asm.process(&packets[1]).status, PacketStatus::Accepted);
    }

    #[test]
    fn completion_is_emitted_exactly_once() {
        let packets = build_packets(0, "once", &content(64), 16, CorrectionLevel::H).unwrap();
        let mut asm = Assembler::new();

        let mut completions = 0;
        for _ in 0..3 {
            for p in &packets {
                if asm.process(p).completed.is_some() {
                    completions += 1;
                }
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(asm.counters().files_completed, 1);
        assert_eq!(asm.counters().duplicates, 2 * packets.len() as u64);
    }

// # ❌ 3. Corruption containment

    #[test]
    fn corrupted_packet_is_contained_and_recoverable() {
        let packets = build_packets(0, "c", &content(30), 10, CorrectionLevel::M).unwrap();
        let mut asm = Assembler::new();
        asm.process(&packets[0]);

        let good = &packets[2];
        let bad = good.to_builder().payload_crc32(good.payload_crc32() ^ 0x1).build();

        let before = asm.snapshot(good.file_id()).unwrap();
        let res = asm.process(&bad);
        assert_eq!(res.status, PacketStatus::InvalidCrc);
        assert!(res.status.is_rejection());
        assert_eq!(res.snapshot.received_chunks, before.received_chunks);
        assert_eq!(res.snapshot.received_bytes, before.received_bytes);
        assert_eq!(res.snapshot.invalid_chunks, 1);

        assert_eq!(asm.process(good).status, PacketStatus::Accepted);
    }

    #[test]
    fn corrupted_payload_bytes_are_rejected() {
        let packets = build_packets(0, "c", &content(30), 10, CorrectionLevel::M).unwrap();
        let good = &packets[1];
        let mut bytes = good.payload().to_vec();
        bytes[3] ^= 0xFF;
        let bad = good.to_builder().payload(bytes).build();

        let mut asm = Assembler::new();
        assert_eq!(asm.process(&bad).status, PacketStatus::InvalidCrc);
        assert_eq!(asm.process(good).status, PacketStatus::Accepted);
    }

    #[test]
    fn out_of_bounds_chunk_is_rejected() {
        let packets = build_packets(0, "oob", &content(20), 10, CorrectionLevel::M).unwrap();
        let mut asm = Assembler::new();
        asm.process(&packets[1]);

        let stray = packets[2].to_builder().offset(15).reseal().build();
        let res = asm.process(&stray);
        assert_eq!(res.status, PacketStatus::InvalidCrc);
        assert_eq!(res.snapshot.invalid_chunks, 1);
        assert_eq!(res.snapshot.received_bytes, 10);
    }

    #[test]
    fn overlapping_chunk_that_overflows_is_rejected() {
        let packets = build_packets(0, "ovl", &content(20), 10, CorrectionLevel::M).unwrap();
        let mut asm = Assembler::new();
        asm.process(&packets[1]);
        asm.process(&packets[2]);

        let overlap = packets[1].to_builder().offset(5).reseal().build();
        assert_eq!(asm.process(&overlap).status, PacketStatus::InvalidCrc);
    }

    #[test]
    fn conflicting_metadata_length_is_rejected() {
        let blob = content(20);
        let packets = Encoder::default().encode_with_id("conflict", 0, "n", &blob).unwrap();
        let mut asm = Assembler::new();
        asm.process(&packets[1]);

        let mut header = decode_metadata(packets[0].payload()).unwrap();
        header.content_len = 99;
        let meta = packets[0]
            .to_builder()
            .payload(encode_metadata(&header).unwrap())
            .reseal()
            .build();
        assert_eq!(asm.process(&meta).status, PacketStatus::InvalidCrc);
        assert!(!asm.snapshot("conflict").unwrap().has_metadata);
    }

    #[test]
    fn undecodable_metadata_is_rejected() {
        let packets = build_packets(0, "m", b"abc", 4, CorrectionLevel::M).unwrap();
        let junk = packets[0].to_builder().payload(vec![0xFFu8; 3]).reseal().build();

        let mut asm = Assembler::new();
        assert_eq!(asm.process(&junk).status, PacketStatus::InvalidCrc);
        assert_eq!(asm.process(&packets[0]).status, PacketStatus::Accepted);
    }

// # 🔄 4. Generation resets

    #[test]
    fn level_change_starts_a_new_generation() {
        let packets = build_packets(0, "g", &content(10), 4, CorrectionLevel::M).unwrap();
        let mut asm = Assembler::new();
        let id = packets[0].file_id().to_owned();

        for p in &packets[..3] {
            asm.process(p);
        }
        let before = asm.snapshot(&id).unwrap();
        assert_eq!(before.received_chunks, 3);

        let h = packets[3].to_builder().correction_level(CorrectionLevel::H).build();
        let res = asm.process(&h);
        assert_eq!(res.status, PacketStatus::Accepted);
        assert_eq!(res.snapshot.received_chunks, 1);
        assert_eq!(res.snapshot.received_bytes, 2);
        assert_eq!(res.snapshot.correction_level, CorrectionLevel::H);
        assert!(!res.snapshot.has_metadata);
        assert_eq!(asm.session(&id).unwrap().generations(), 2);
        assert_eq!(asm.counters().generation_resets, 1);
    }

    #[test]
    fn metadata_copy_with_new_level_starts_a_new_generation() {
        let packets = build_packets(0, "gm", &content(10), 4, CorrectionLevel::M).unwrap();
        let mut asm = Assembler::new();
        let id = packets[0].file_id().to_owned();

        asm.process(&packets[0]);
        asm.process(&packets[1]);

        let h = packets[0].to_builder().correction_level(CorrectionLevel::H).build();
        let res = asm.process(&h);
        assert_eq!(res.status, PacketStatus::Accepted);
        assert_eq!(res.snapshot.received_chunks, 1);
        assert_eq!(res.snapshot.correction_level, CorrectionLevel::H);
        assert!(res.snapshot.has_metadata);

        // Back to M: another generation, not a join of the H one.
        let res = asm.process(&packets[1]);
        assert_eq!(res.status, PacketStatus::Accepted);
        assert_eq!(res.snapshot.correction_level, CorrectionLevel::M);
        assert_eq!(res.snapshot.received_chunks, 1);
        assert!(!res.snapshot.has_metadata);
        assert_eq!(asm.session(&id).unwrap().generations(), 3);
    }

    #[test]
    fn full_transfer_after_chunk_size_change() {
        let blob = content(300);
        let id = "switch";
        let coarse = Encoder::new(EncoderConfig::new(100, CorrectionLevel::L))
            .unwrap()
            .encode_with_id(id, 0, "s", &blob)
            .unwrap();
        let fine = Encoder::new(EncoderConfig::new(32, CorrectionLevel::L))
            .unwrap()
            .encode_with_id(id, 0, "s", &blob)
            .unwrap();

        let mut asm = Assembler::new();
        feed(&mut asm, &coarse[..2]);
        let statuses = feed(&mut asm, &fine);
        assert!(statuses.iter().all(|s| *s == PacketStatus::Accepted));

        let file = asm.try_get_file(id).unwrap();
        assert_eq!(file.data, Bytes::from(blob));
        assert_eq!(asm.snapshot(id).unwrap().chunk_size, 32);
    }

    #[test]
    fn invalid_counter_survives_generation_reset() {
        let packets = build_packets(0, "i", &content(8), 4, CorrectionLevel::M).unwrap();
        let mut asm = Assembler::new();
        let bad = packets[1].to_builder().payload_crc32(0).build();
        asm.process(&bad);

        let h = packets[1].to_builder().correction_level(CorrectionLevel::Q).build();
        let res = asm.process(&h);
        assert_eq!(res.snapshot.invalid_chunks, 1);
    }

// # ❌ 5. Whole-file checksum failure

    #[test]
    fn checksum_failure_resets_then_retry_succeeds() {
        let blob = content(48);
        let id = "retry";
        let packets = Encoder::new(EncoderConfig::new(16, CorrectionLevel::M))
            .unwrap()
            .encode_with_id(id, 0, "r.bin", &blob)
            .unwrap();

        // Every packet declares the same wrong file checksum, including the header.
        let bad_crc = crc32(&blob) ^ 0xDEAD_BEEF;
        let mut header = decode_metadata(packets[0].payload()).unwrap();
        header.file_crc32 = bad_crc;
        let lying: Vec<Packet> = packets
            .iter()
            .map(|p| {
                let b = p.to_builder().file_crc32(bad_crc);
                if p.is_metadata() {
                    b.payload(encode_metadata(&header).unwrap()).reseal().build()
                } else {
                    b.build()
                }
            })
            .collect();

        let mut asm = Assembler::new();
        let statuses = feed(&mut asm, &lying);
        assert!(statuses[..statuses.len() - 1].iter().all(|s| *s == PacketStatus::Accepted));
        assert_eq!(statuses.last(), Some(&PacketStatus::InvalidFileChecksum));

        let snap = asm.snapshot(id).unwrap();
        assert_eq!(snap.checksum_failures, 1);
        assert_eq!(snap.received_chunks, 0);
        assert_eq!(snap.received_bytes, 0);
        assert_eq!(snap.state, SessionState::Accumulating);
        assert!(snap.has_metadata);
        assert_eq!(snap.expected_total_length, Some(48));
        assert!(asm.try_get_file(id).is_none());

        let mut completed = None;
        for p in &packets {
            let res = asm.process(p);
            assert_eq!(res.status, PacketStatus::Accepted);
            completed = completed.or(res.completed);
        }
        assert_eq!(completed.unwrap().data, Bytes::from(blob));
        assert_eq!(asm.snapshot(id).unwrap().checksum_failures, 1);
        assert_eq!(asm.counters().checksum_failures, 1);
    }

    #[test]
    fn bad_chunk_then_data_only_resend_completes() {
        let blob = content(20);
        let packets = build_packets(0, "d.bin", &blob, 10, CorrectionLevel::M).unwrap();
        let id = packets[0].file_id().to_owned();

        // Self-consistent payload CRC, wrong bytes.
        let wrong = packets[2].to_builder().payload(vec![0u8; 10]).reseal().build();

        let mut asm = Assembler::new();
        asm.process(&packets[0]);
        asm.process(&packets[1]);
        let fail = asm.process(&wrong);
        assert_eq!(fail.status, PacketStatus::InvalidFileChecksum);
        assert_eq!(fail.snapshot.state, SessionState::Accumulating);
        assert!(fail.snapshot.has_metadata);
        assert_eq!(fail.snapshot.received_chunks, 0);

        assert_eq!(asm.process(&packets[1]).status, PacketStatus::Accepted);
        let done = asm.process(&packets[2]);
        assert_eq!(done.status, PacketStatus::Accepted);
        assert_eq!(done.completed.unwrap().data, Bytes::from(blob));
    }

    #[test]
    fn metadata_resend_after_checksum_failure_is_accepted() {
        let packets = build_packets(0, "m.bin", &content(8), 4, CorrectionLevel::M).unwrap();
        let wrong = packets[2].to_builder().payload(vec![9u8; 4]).reseal().build();

        let mut asm = Assembler::new();
        feed(&mut asm, &[packets[0].clone(), packets[1].clone(), wrong]);
        assert_eq!(asm.process(&packets[0]).status, PacketStatus::Accepted);
        assert_eq!(asm.process(&packets[0]).status, PacketStatus::Duplicate);
    }

// # ✅ 6. Empty content

    #[test]
    fn empty_file_completes_on_data_packet() {
        let packets = build_packets(0, "empty.txt", b"", 8, CorrectionLevel::L).unwrap();
        assert_eq!(packets.len(), 2);

        let mut asm = Assembler::new();
        let meta = asm.process(&packets[0]);
        assert_eq!(meta.status, PacketStatus::Accepted);
        assert!(meta.completed.is_none());

        let data = asm.process(&packets[1]);
        let file = data.completed.unwrap();
        assert!(file.is_empty());
        assert_eq!(file.file_checksum, 0);
        assert_eq!(file.file_name, "empty.txt");
    }

    #[test]
    fn empty_file_in_reverse_order() {
        let packets = build_packets(0, "e", b"", 8, CorrectionLevel::L).unwrap();
        let mut asm = Assembler::new();
        assert!(asm.process(&packets[1]).completed.is_none());
        assert!(asm.process(&packets[0]).completed.is_some());
    }

// # 🗂 7. Sessions and the completed-file store

    #[test]
    fn completed_file_outlives_session() {
        let packets = build_packets(0, "keep", &content(12), 4, CorrectionLevel::M).unwrap();
        let id = packets[0].file_id().to_owned();
        let mut asm = Assembler::new();
        feed(&mut asm, &packets);

        assert!(asm.remove_session(&id).is_some());
        assert_eq!(asm.session_count(), 0);
        assert!(asm.snapshot(&id).is_none());
        assert_eq!(asm.try_get_file(&id).unwrap().len(), 12);
    }

    #[test]
    fn completed_file_outlives_generation_reset() {
        let packets = build_packets(0, "keep", &content(12), 4, CorrectionLevel::M).unwrap();
        let id = packets[0].file_id().to_owned();
        let mut asm = Assembler::new();
        feed(&mut asm, &packets);

        let other = packets[1].to_builder().chunk_size(5).build();
        asm.process(&other);
        assert_eq!(asm.snapshot(&id).unwrap().state, SessionState::NoMetadata);
        assert!(asm.try_get_file(&id).is_some());
    }

    #[test]
    fn same_blob_twice_gives_independent_sessions() {
        let blob = content(20);
        let a = build_packets(0, "same", &blob, 8, CorrectionLevel::M).unwrap();
        let b = build_packets(0, "same", &blob, 8, CorrectionLevel::M).unwrap();
        assert_ne!(a[0].file_id(), b[0].file_id());

        let mut asm = Assembler::new();
        feed(&mut asm, &a[..2]);
        feed(&mut asm, &b);
        assert_eq!(asm.session_count(), 2);
        assert!(asm.try_get_file(b[0].file_id()).is_some());
        assert!(asm.try_get_file(a[0].file_id()).is_none());
    }

    #[test]
    fn interleaved_transfers_complete_independently() {
        let x = build_packets(1, "x", &content(90), 10, CorrectionLevel::L).unwrap();
        let y = build_packets(2, "y", &content(45), 7, CorrectionLevel::H).unwrap();

        let mut asm = Assembler::new();
        let longest = x.len().max(y.len());
        for n in 0..longest {
            if let Some(p) = x.get(n) {
                asm.process(p);
            }
            if let Some(p) = y.get(n) {
                asm.process(p);
            }
        }
        assert_eq!(asm.store().len(), 2);
        assert_eq!(asm.try_get_file(y[0].file_id()).unwrap().file_name, "y");
    }

    #[test]
    fn file_index_does_not_split_sessions() {
        let packets = build_packets(3, "idx", &content(8), 4, CorrectionLevel::M).unwrap();
        let mut asm = Assembler::new();
        asm.process(&packets[0]);
        asm.process(&packets[1].to_builder().file_index(9).build());
        asm.process(&packets[2]);
        assert_eq!(asm.session_count(), 1);
        assert!(asm.try_get_file(packets[0].file_id()).is_some());
    }

    #[test]
    fn store_is_reachable_from_the_host() {
        let a = build_packets(0, "a", &content(6), 4, CorrectionLevel::M).unwrap();
        let b = build_packets(0, "b", &content(6), 4, CorrectionLevel::M).unwrap();
        let mut asm = Assembler::new();
        feed(&mut asm, &a);
        feed(&mut asm, &b);

        assert!(asm.store_mut().remove(a[0].file_id()).is_some());
        assert!(asm.try_get_file(a[0].file_id()).is_none());

        let store = asm.into_store();
        let ids: Vec<&str> = store.file_ids().collect();
        assert_eq!(ids, vec![b[0].file_id()]);
    }

    #[test]
    fn unknown_file_id_has_nothing() {
        let asm = Assembler::new();
        assert!(asm.try_get_file("nope").is_none());
        assert!(asm.snapshot("nope").is_none());
    }

// # 📊 8. Telemetry

    #[test]
    fn telemetry_buckets_every_packet() {
        let packets = build_packets(0, "t", &content(40), 10, CorrectionLevel::M).unwrap();
        let mut asm = Assembler::new();
        feed(&mut asm, &packets);
        asm.process(&packets[2]);
        asm.process(&packets[3].to_builder().payload_crc32(1).build());

        let t = asm.telemetry();
        assert!(t.sanity_check());
        assert_eq!(t.packets_seen, packets.len() as u64 + 2);
        assert_eq!(t.packets_accepted, packets.len() as u64);
        assert_eq!(t.duplicates, 1);
        assert_eq!(t.invalid_packets, 1);
        assert_eq!(t.files_completed, 1);
        assert_eq!(t.bytes_accepted, 40);
        assert_eq!(t.stored_files, 1);
        assert_eq!(t.live_sessions, 1);
    }
}
