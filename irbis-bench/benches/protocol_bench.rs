//! Protocol encoding/decoding benchmarks.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use irbis_client::operations::{ReadRecord, Search};
use irbis_client::Operation;
use irbis_protocol::{
    ClientQuery, Command, Field, Record, SearchParameters, ServerResponse, Session,
};

fn create_session() -> Session {
    let mut session = Session::from_connection_string(
        "host=127.0.0.1;port=6666;database=IBIS;user=librarian;password=secret;",
    );
    session.client_id = 123456;
    session
}

fn create_record(fields: usize) -> Record {
    let mut record = Record::new();
    record.mfn = 42;
    record.version = 3;
    for i in 0..fields {
        record.add(
            Field::new(200 + (i as u32 % 50))
                .add('a', "Заглавие записи")
                .add('e', "сведения, относящиеся к заглавию")
                .add('f', format!("Автор {i}")),
        );
    }
    record
}

/// Builds a server reply with the usual preamble.
fn create_reply(command: &str, payload: &[String]) -> Bytes {
    let mut text = format!("{command}\r\n123456\r\n1\r\n0\r\n64.2018.1\r\n\r\n\r\n\r\n\r\n\r\n");
    for line in payload {
        text.push_str(line);
        text.push_str("\r\n");
    }
    Bytes::from(text.into_bytes())
}

fn bench_query_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_encode");

    for lines in [10, 100, 1000] {
        group.throughput(Throughput::Elements(lines as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &lines, |b, &lines| {
            let mut session = create_session();
            b.iter(|| {
                let mut query = ClientQuery::new(&mut session, Command::UpdateRecord).unwrap();
                for i in 0..lines {
                    query.append_narrow("Строка в кодировке Windows-1251").unwrap();
                    query.append_int(i as i64);
                }
                black_box(query.finalize())
            });
        });
    }

    group.finish();
}

fn bench_response_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("response_lines");

    for lines in [10, 100, 1000] {
        let payload: Vec<String> = (0..lines).map(|i| format!("{i}#K=ТЕРМИН {i}")).collect();
        let reply = create_reply("H", &payload);

        group.throughput(Throughput::Bytes(reply.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &reply, |b, reply| {
            b.iter(|| {
                let mut response = ServerResponse::parse(reply.clone()).unwrap();
                black_box(response.remaining_wide_lines().unwrap())
            });
        });
    }

    group.finish();
}

fn bench_record_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("record");

    for fields in [10, 100] {
        let record = create_record(fields);
        let lines = record.encode();

        group.bench_with_input(BenchmarkId::new("encode", fields), &record, |b, record| {
            b.iter(|| black_box(record.to_protocol_text()));
        });
        group.bench_with_input(BenchmarkId::new("parse", fields), &lines, |b, lines| {
            b.iter(|| black_box(Record::parse(lines).unwrap()));
        });
    }

    group.finish();
}

fn bench_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("operation");

    let record = create_record(50);
    let mut payload = vec!["0".to_string()];
    payload.extend(record.encode());
    let reply = create_reply("C", &payload);
    let op = ReadRecord::new("IBIS", 42);
    group.bench_function("read_record_parse", |b| {
        b.iter(|| black_box(op.parse(reply.clone()).unwrap()));
    });

    let mut payload = vec!["0".to_string(), "1000".to_string()];
    payload.extend((1..=1000).map(|mfn| mfn.to_string()));
    let reply = create_reply("K", &payload);
    let op = Search::new("IBIS", SearchParameters::new("K=АЛГЕБРА$"));
    group.bench_function("search_build", |b| {
        let mut session = create_session();
        b.iter(|| black_box(op.build(&mut session).unwrap().finalize()));
    });
    group.bench_function("search_parse", |b| {
        b.iter(|| black_box(op.parse(reply.clone()).unwrap()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_query_encode,
    bench_response_lines,
    bench_record_roundtrip,
    bench_operations,
);

criterion_main!(benches);
