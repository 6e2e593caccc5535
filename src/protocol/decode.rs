//! Datagram decoding
//!
//! [`parse`] validates the envelope and hands the rest of the buffer to the
//! field decoder selected by the message type. Fields are read strictly in
//! wire order; the first failing read aborts the whole decode. Bytes left over
//! after the last known field are ignored, newer schemas append fields.
//!
//! Decode and WSPR decode messages carry only a time of day. Their `full_time`
//! is placed on the current UTC day, so a datagram decoded long after it was
//! produced (around midnight, or replayed from a capture) can land on the wrong
//! date. Use [`parse_at`] to choose the day explicitly.
//!
//! All 16 message types decode, including the commands WSJT-X only receives
//! (Reply, Replay, HaltTx, FreeText, Location, HighlightCallsign,
//! SwitchConfiguration, Configure). Only tags 16 and up are `UnknownMessageType`.

use chrono::{NaiveDate, Utc};

use crate::core::{Error, Result, SpecialOperationMode};
use crate::util::dbm_to_watts;
use super::message::*;
use super::reader::Reader;
use super::{MessageType, HEADER_LEN, MAGIC};

/// Decodes one datagram, anchoring time-of-day fields on today's UTC date
pub fn parse(buf: &[u8]) -> Result<Response> {
    parse_at(buf, Utc::now().date_naive())
}

/// Decodes one datagram, anchoring time-of-day fields on `today`
pub fn parse_at(buf: &[u8], today: NaiveDate) -> Result<Response> {
    if buf.len() < HEADER_LEN {
        return Err(Error::TooShort);
    }

    let mut r = Reader::new(buf, today);
    let magic = r.u32()?;
    if magic != MAGIC {
        return Err(Error::InvalidMagic(magic));
    }
    let _schema = r.u32()?;
    let message_type = MessageType::try_from(r.u32()?)?;

    let response = match message_type {
        MessageType::Heartbeat => Response::Heartbeat(Heartbeat::read_fields(&mut r)?),
        MessageType::Status => Response::Status(Status::read_fields(&mut r)?),
        MessageType::Decode => Response::Decode(Decode::read_fields(&mut r)?),
        MessageType::Clear => Response::Clear(Clear::read_fields(&mut r)?),
        MessageType::Reply => Response::Reply(Reply::read_fields(&mut r)?),
        MessageType::QsoLogged => Response::QsoLogged(QsoLogged::read_fields(&mut r)?),
        MessageType::Close => Response::Close(Close::read_fields(&mut r)?),
        MessageType::Replay => Response::Replay(Replay::read_fields(&mut r)?),
        MessageType::HaltTx => Response::HaltTx(HaltTx::read_fields(&mut r)?),
        MessageType::FreeText => Response::FreeText(FreeText::read_fields(&mut r)?),
        MessageType::WsprDecode => Response::WsprDecode(WsprDecode::read_fields(&mut r)?),
        MessageType::Location => Response::Location(Location::read_fields(&mut r)?),
        MessageType::LoggedAdif => Response::LoggedAdif(LoggedAdif::read_fields(&mut r)?),
        MessageType::HighlightCallsign => {
            Response::HighlightCallsign(HighlightCallsign::read_fields(&mut r)?)
        }
        MessageType::SwitchConfiguration => {
            Response::SwitchConfiguration(SwitchConfiguration::read_fields(&mut r)?)
        }
        MessageType::Configure => Response::Configure(Configure::read_fields(&mut r)?),
    };

    Ok(response)
}

/// Reads the fields following the envelope
///
/// Struct literal fields are evaluated in source order, which is wire order here.
pub trait ReadFields: Sized {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self>;
}

impl ReadFields for Heartbeat {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Heartbeat {
            id: r.utf8()?,
            max_schema_number: r.u32()?,
            version: r.utf8()?,
            revision: r.utf8()?,
        })
    }
}

impl ReadFields for Status {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Status {
            id: r.utf8()?,
            dial: r.u64()?,
            mode: r.utf8()?,
            dx_call: r.utf8()?,
            report: r.utf8()?,
            tx_mode: r.utf8()?,
            tx_enabled: r.boolean()?,
            transmitting: r.boolean()?,
            decoding: r.boolean()?,
            rx_df: r.u32()?,
            tx_df: r.u32()?,
            de_call: r.utf8()?,
            de_grid: r.utf8()?,
            dx_grid: r.utf8()?,
            tx_watchdog: r.boolean()?,
            sub_mode: r.utf8()?,
            fast_mode: r.boolean()?,
            special_operation_mode: SpecialOperationMode::from_u8(r.u8()?),
            frequency_tolerance: r.u32()?,
            tr_period: r.u32()?,
            configuration_name: r.utf8()?,
            tx_message: r.utf8()?,
        })
    }
}

impl ReadFields for Decode {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        let id = r.utf8()?;
        let new = r.boolean()?;
        let (time, full_time) = r.time_of_day()?;
        Ok(Decode {
            id,
            new,
            time,
            full_time,
            snr: r.i32()?,
            delta_time: r.f64()?,
            delta_frequency_hz: r.u32()?,
            mode: r.utf8()?,
            message: r.utf8()?,
            low_confidence: r.boolean()?,
            off_air: r.boolean()?,
        })
    }
}

impl ReadFields for Clear {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        let id = r.utf8()?;
        let window = if r.remaining() > 0 { r.u8()? } else { 0 };
        Ok(Clear { id, window })
    }
}

impl ReadFields for Reply {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Reply {
            id: r.utf8()?,
            time: r.u32()?,
            snr: r.i32()?,
            delta_time: r.f64()?,
            delta_frequency_hz: r.u32()?,
            mode: r.utf8()?,
            message: r.utf8()?,
            low_confidence: r.boolean()?,
            modifiers: r.u8()?,
        })
    }
}

impl ReadFields for QsoLogged {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        Ok(QsoLogged {
            id: r.utf8()?,
            date_time_off: r.date_time()?,
            dx_call: r.utf8()?,
            dx_grid: r.utf8()?,
            tx_frequency_hz: r.u64()?,
            mode: r.utf8()?,
            report_sent: r.utf8()?,
            report_received: r.utf8()?,
            tx_power: r.utf8()?,
            comments: r.utf8()?,
            name: r.utf8()?,
            date_time_on: r.date_time()?,
            operator_call: r.utf8()?,
            my_call: r.utf8()?,
            my_grid: r.utf8()?,
            exchange_sent: r.utf8()?,
            exchange_received: r.utf8()?,
            adif_propagation_mode: r.utf8()?,
        })
    }
}

impl ReadFields for Close {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Close { id: r.utf8()? })
    }
}

impl ReadFields for Replay {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Replay { id: r.utf8()? })
    }
}

impl ReadFields for HaltTx {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        Ok(HaltTx {
            id: r.utf8()?,
            auto_tx_only: r.boolean()?,
        })
    }
}

impl ReadFields for FreeText {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        Ok(FreeText {
            id: r.utf8()?,
            text: r.utf8()?,
            send: r.boolean()?,
        })
    }
}

impl ReadFields for WsprDecode {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        let id = r.utf8()?;
        let new = r.boolean()?;
        let (time, full_time) = r.time_of_day()?;
        let snr = r.i32()?;
        let delta_time = r.f64()?;
        let frequency_hz = r.u64()?;
        let drift_hz = r.i32()?;
        let callsign = r.utf8()?;
        let grid = r.utf8()?;
        let power_dbm = r.i32()?;
        Ok(WsprDecode {
            id,
            new,
            time,
            full_time,
            snr,
            delta_time,
            frequency_hz,
            drift_hz,
            callsign,
            grid,
            power_dbm,
            power_watts: dbm_to_watts(power_dbm),
            off_air: r.boolean()?,
        })
    }
}

impl ReadFields for Location {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Location {
            id: r.utf8()?,
            location: r.utf8()?,
        })
    }
}

impl ReadFields for LoggedAdif {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        Ok(LoggedAdif {
            id: r.utf8()?,
            adif: r.utf8()?,
        })
    }
}

impl ReadFields for HighlightCallsign {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        Ok(HighlightCallsign {
            id: r.utf8()?,
            callsign: r.utf8()?,
            background_color: r.color()?,
            foreground_color: r.color()?,
            highlight_last: r.boolean()?,
        })
    }
}

impl ReadFields for SwitchConfiguration {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        Ok(SwitchConfiguration {
            id: r.utf8()?,
            configuration_name: r.utf8()?,
        })
    }
}

impl ReadFields for Configure {
    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Configure {
            id: r.utf8()?,
            mode: r.utf8()?,
            frequency_tolerance: r.u32()?,
            submode: r.utf8()?,
            fast_mode: r.boolean()?,
            tr_period: r.u32()?,
            rx_df: r.u32()?,
            dx_call: r.utf8()?,
            dx_grid: r.utf8()?,
            generate_messages: r.boolean()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const HEARTBEAT: &str = "adbccbda00000002000000000000000657534a542d580000000300000005322e342e3000000006633139643632";
    const STATUS: &str = "adbccbda00000002000000010000000657534a542d580000000001142f2000000003465438000000055858585858000000022d3600000003465438000001000003750000037500000006495535504d50000000064a4e3533455200000004494f393100ffffffff0000ffffffffffffffff0000000744656661756c7400000025585858585820495535504d50204a4e35332020202020202020202020202020202020202020";
    const DECODE: &str = "adbccbda00000002000000020000000657534a542d5801021b3ee0fffffff1bfb99999a000000000000581000000017e000000105858585858205959595959204c4f31310000";
    const CLEAR: &str = "adbccbda00000002000000030000000657534a542d58";
    const QSO_LOGGED: &str = "adbccbda00000002000000050000000657534a542d5800000000002587df024adb8f01000000055959595959000000044a4e383600000000006bf37c00000003465438000000032b3132000000032d323400000002323000000019465438202053656e743a202b31322020526376643a202d32340000000000000000002587df0249f275010000000000000006495535504d50000000064a4e353345520000000000000000ffffffff";
    const CLOSE: &str = "adbccbda00000002000000060000000657534a542d58";
    const WSPR_DECODE: &str = "adbccbda000000020000000a0000000657534a542d580103cff3c0ffffffff3fb99999a00000000000000000d71ac4000000000000000645413755524300000004494d37370000001b00";
    const LOGGED_ADIF: &str = "adbccbda000000020000000c0000000657534a542d58000001550a3c616469665f7665723a353e332e312e300a3c70726f6772616d69643a363e57534a542d580a3c454f483e0a3c63616c6c3a353e5959595959203c677269647371756172653a343e4a4e3836203c6d6f64653a333e465438203c7273745f73656e743a333e2b3132203c7273745f726376643a333e2d3234203c71736f5f646174653a383e3230323230323034203c74696d655f6f6e3a363e313034303030203c71736f5f646174655f6f66663a383e3230323230323034203c74696d655f6f66663a363e313034313030203c62616e643a333e34306d203c667265713a383e372e303734363834203c73746174696f6e5f63616c6c7369676e3a363e495535504d50203c6d795f677269647371756172653a363e4a4e35334552203c74785f7077723a323e3230203c636f6d6d656e743a32353e465438202053656e743a202b31322020526376643a202d3234203c454f523e";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 2, 4).unwrap()
    }

    fn decode(hex: &str) -> Result<Response> {
        parse_at(&hex::decode(hex).unwrap(), today())
    }

    #[test]
    fn test_parse_heartbeat() {
        assert_eq!(
            decode(HEARTBEAT).unwrap(),
            Response::Heartbeat(Heartbeat {
                id: "WSJT-X".into(),
                max_schema_number: 3,
                version: "2.4.0".into(),
                revision: "c19d62".into(),
            })
        );
    }

    #[test]
    fn test_parse_status() {
        let status = match decode(STATUS).unwrap() {
            Response::Status(status) => status,
            other => panic!("Decoded wrong message type: {:?}", other),
        };
        assert_eq!(status.id, "WSJT-X");
        assert_eq!(status.dial, 18_100_000);
        assert_eq!(status.mode, "FT8");
        assert_eq!(status.dx_call, "XXXXX");
        assert_eq!(status.report, "-6");
        assert_eq!(status.tx_mode, "FT8");
        assert!(!status.tx_enabled);
        assert!(!status.transmitting);
        assert!(status.decoding);
        assert_eq!(status.rx_df, 885);
        assert_eq!(status.tx_df, 885);
        assert_eq!(status.de_call, "IU5PMP");
        assert_eq!(status.de_grid, "JN53ER");
        assert_eq!(status.dx_grid, "IO91");
        assert!(!status.tx_watchdog);
        assert_eq!(status.sub_mode, "");
        assert!(!status.fast_mode);
        assert_eq!(status.special_operation_mode, SpecialOperationMode::None);
        assert_eq!(status.frequency_tolerance, u32::MAX);
        assert_eq!(status.tr_period, u32::MAX);
        assert_eq!(status.configuration_name, "Default");
        assert_eq!(status.tx_message, "XXXXX IU5PMP JN53                    ");
    }

    #[test]
    fn test_parse_decode() {
        assert_eq!(
            decode(DECODE).unwrap(),
            Response::Decode(Decode {
                id: "WSJT-X".into(),
                new: true,
                time: 35_340_000,
                full_time: Utc.with_ymd_and_hms(2022, 2, 4, 9, 49, 0).unwrap(),
                snr: -15,
                delta_time: -0.10000000149011612,
                delta_frequency_hz: 1409,
                mode: "~".into(),
                message: "XXXXX YYYYY LO11".into(),
                low_confidence: false,
                off_air: false,
            })
        );
    }

    #[test]
    fn test_parse_decode_uses_current_day() {
        let buf = hex::decode(DECODE).unwrap();
        let before = Utc::now().date_naive();
        let decoded = match parse(&buf).unwrap() {
            Response::Decode(decoded) => decoded,
            other => panic!("Decoded wrong message type: {:?}", other),
        };
        let after = Utc::now().date_naive();
        let day = decoded.full_time.date_naive();
        assert!(day == before || day == after);
    }

    #[test]
    fn test_parse_clear_without_window() {
        assert_eq!(
            decode(CLEAR).unwrap(),
            Response::Clear(Clear {
                id: "WSJT-X".into(),
                window: 0,
            })
        );
    }

    #[test]
    fn test_parse_qso_logged() {
        assert_eq!(
            decode(QSO_LOGGED).unwrap(),
            Response::QsoLogged(QsoLogged {
                id: "WSJT-X".into(),
                date_time_off: Utc.with_ymd_and_hms(2022, 2, 4, 10, 41, 0).unwrap(),
                dx_call: "YYYYY".into(),
                dx_grid: "JN86".into(),
                tx_frequency_hz: 7_074_684,
                mode: "FT8".into(),
                report_sent: "+12".into(),
                report_received: "-24".into(),
                tx_power: "20".into(),
                comments: "FT8  Sent: +12  Rcvd: -24".into(),
                name: "".into(),
                date_time_on: Utc.with_ymd_and_hms(2022, 2, 4, 10, 40, 0).unwrap(),
                operator_call: "".into(),
                my_call: "IU5PMP".into(),
                my_grid: "JN53ER".into(),
                exchange_sent: "".into(),
                exchange_received: "".into(),
                adif_propagation_mode: "".into(),
            })
        );
    }

    #[test]
    fn test_parse_close() {
        assert_eq!(
            decode(CLOSE).unwrap(),
            Response::Close(Close { id: "WSJT-X".into() })
        );
    }

    #[test]
    fn test_parse_wspr_decode() {
        let wspr = match decode(WSPR_DECODE).unwrap() {
            Response::WsprDecode(wspr) => wspr,
            other => panic!("Decoded wrong message type: {:?}", other),
        };
        assert!((wspr.power_watts - 0.5011872336272725).abs() < 1e-12);
        assert_eq!(
            wspr,
            WsprDecode {
                id: "WSJT-X".into(),
                new: true,
                time: 63_960_000,
                full_time: Utc.with_ymd_and_hms(2022, 2, 4, 17, 46, 0).unwrap(),
                snr: -1,
                delta_time: 0.10000000149011612,
                frequency_hz: 14_097_092,
                drift_hz: 0,
                callsign: "EA7URC".into(),
                grid: "IM77".into(),
                power_dbm: 27,
                power_watts: wspr.power_watts,
                off_air: false,
            }
        );
    }

    #[test]
    fn test_parse_logged_adif() {
        let adif = match decode(LOGGED_ADIF).unwrap() {
            Response::LoggedAdif(adif) => adif,
            other => panic!("Decoded wrong message type: {:?}", other),
        };
        assert_eq!(adif.id, "WSJT-X");
        assert!(adif.adif.starts_with("\n<adif_ver:5>3.1.0\n<programid:6>WSJT-X\n<EOH>\n"));
        assert!(adif.adif.contains("<call:5>YYYYY <gridsquare:4>JN86 <mode:3>FT8"));
        assert!(adif.adif.ends_with("<comment:25>FT8  Sent: +12  Rcvd: -24 <EOR>"));
        assert_eq!(adif.adif.len(), 0x155);
    }

    #[test]
    fn test_short_buffers() {
        assert!(matches!(parse(&[]), Err(Error::TooShort)));
        assert!(matches!(parse(&[0xad, 0xbc, 0xcb]), Err(Error::TooShort)));
        let header = hex::decode("adbccbda0000000200000000").unwrap();
        for len in 0..header.len() {
            assert!(matches!(parse(&header[..len]), Err(Error::TooShort)));
        }
        // envelope only: the client id is missing
        assert!(matches!(parse(&header), Err(Error::TooShort)));
    }

    #[test]
    fn test_every_truncation_is_too_short() {
        let buf = hex::decode(QSO_LOGGED).unwrap();
        for len in 0..buf.len() {
            assert!(
                matches!(parse_at(&buf[..len], today()), Err(Error::TooShort)),
                "truncated to {} bytes",
                len
            );
        }
    }

    #[test]
    fn test_invalid_magic() {
        let buf = hex::decode("adbccbdb00000002000000060000000657534a542d58").unwrap();
        assert!(matches!(parse(&buf), Err(Error::InvalidMagic(0xadbccbdb))));
    }

    #[test]
    fn test_unknown_message_type() {
        let buf = hex::decode("adbccbda00000002000000100000000657534a542d58").unwrap();
        assert!(matches!(parse(&buf), Err(Error::UnknownMessageType(16))));
    }

    #[test]
    fn test_schema_is_not_validated() {
        let buf = hex::decode("adbccbda00000063000000060000000657534a542d58").unwrap();
        assert_eq!(
            parse(&buf).unwrap(),
            Response::Close(Close { id: "WSJT-X".into() })
        );
    }

    #[test]
    fn test_invalid_date_time_spec() {
        let mut buf = hex::decode(QSO_LOGGED).unwrap();
        // time spec of the first QDateTime follows envelope, id and 12 bytes
        let spec_offset = 12 + 4 + 6 + 12;
        assert_eq!(buf[spec_offset], 0x01);
        buf[spec_offset] = 0x02;
        assert!(matches!(parse(&buf), Err(Error::InvalidDateTimeSpec(2))));
    }

    /// QSO logged datagram with its first QDateTime replaced
    fn qso_logged_with_date_off(julian_day: u64, ms: u32, spec: u8) -> Vec<u8> {
        let mut buf = hex::decode(QSO_LOGGED).unwrap();
        let offset = 12 + 4 + 6;
        buf[offset..offset + 8].copy_from_slice(&julian_day.to_be_bytes());
        buf[offset + 8..offset + 12].copy_from_slice(&ms.to_be_bytes());
        buf[offset + 12] = spec;
        buf
    }

    #[test]
    fn test_julian_day_out_of_range() {
        let buf = qso_logged_with_date_off(u64::MAX, 0, 1);
        assert!(matches!(
            parse_at(&buf, today()),
            Err(Error::DateOutOfRange(u64::MAX))
        ));
    }

    #[test]
    fn test_time_past_last_representable_day() {
        let last = crate::protocol::time::julian_day(NaiveDate::MAX) as u64;
        for spec in [0u8, 1] {
            let buf = qso_logged_with_date_off(last, u32::MAX, spec);
            assert!(matches!(
                parse_at(&buf, today()),
                Err(Error::DateOutOfRange(jd)) if jd == last
            ));
        }

        let buf = qso_logged_with_date_off(last, 86_399_999, 1);
        match parse_at(&buf, today()).unwrap() {
            Response::QsoLogged(qso) => assert_eq!(
                qso.date_time_off.naive_utc(),
                NaiveDate::MAX.and_hms_opt(23, 59, 59).unwrap()
            ),
            other => panic!("Decoded wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_date_time_spec_high_byte() {
        let buf = qso_logged_with_date_off(2_459_615, 0, 0xff);
        assert!(matches!(
            parse_at(&buf, today()),
            Err(Error::InvalidDateTimeSpec(255))
        ));
    }

    #[test]
    fn test_null_client_id() {
        let buf = hex::decode("adbccbda0000000200000006ffffffff").unwrap();
        assert_eq!(
            parse(&buf).unwrap(),
            Response::Close(Close { id: String::new() })
        );
    }

    #[test]
    fn test_trailing_bytes_are_ignored() {
        let mut buf = hex::decode(HEARTBEAT).unwrap();
        buf.extend_from_slice(&[0xde, 0xad]);
        assert!(matches!(parse(&buf).unwrap(), Response::Heartbeat(_)));
    }
}
