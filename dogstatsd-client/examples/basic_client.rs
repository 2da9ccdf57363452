use std::{
    thread::sleep,
    time::{Duration, Instant},
};

use dogstatsd_client::Client;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

fn main() {
    tracing_subscriber::fmt::init();

    let mut client = Client::new("127.0.0.1:8125").expect("failed to create client");
    client.set_namespace("example.");
    client.set_global_tags(["service:example"]);

    client
        .event("example started", "sending a stream of pretend work metrics", &[])
        .expect("failed to send event");

    let mut rng = Xoshiro256StarStar::try_from_rng(&mut rand::rng()).unwrap();

    // Loop over and over, pretending to do some work.
    loop {
        let loop_started = Instant::now();

        client.count("loop.iterations", 1, &[], 1.0).expect("failed to send count");

        let busy = Duration::from_millis(rng.random_range(5..50));
        sleep(busy);

        // Timers are high-frequency in real workloads, so sample them down.
        client
            .timer("loop.busy", loop_started.elapsed(), &["kind:pretend"], 0.5)
            .expect("failed to send timer");
    }
}
