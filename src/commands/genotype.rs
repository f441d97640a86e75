use crate::cli::GenotypeArgs;
use crate::strtyper::{
    genotype::{ClusterConfig, ClusterEngine, Genotyper},
    locus::stream_variants_into_channel,
    variant::Variant,
    workflows::{analyze, Params},
    writers::{BedWriter, TsvWriter},
};
use crate::utils::{create_writer, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use rayon::{
    iter::{ParallelBridge, ParallelIterator},
    ThreadPoolBuilder,
};
use std::{collections::BTreeMap, sync::Arc, thread};

const CHANNEL_BUFFER_SIZE: usize = 2048;

pub fn strtyper(args: GenotypeArgs) -> Result<()> {
    let genotyper = Arc::new(Genotyper::new(
        ClusterEngine::new(cluster_config_from_args(&args)),
        args.genotype_in_size,
    ));
    log::debug!("Clustering with {:?}", genotyper.engine().config());
    let workflow_params = Arc::new(Params {
        min_expansion: args.min_expansion.map(f64::from),
        min_support: args.min_support,
    });

    let bed_writer = create_writer(&args.output_prefix, "bed", BedWriter::new)?;
    let tsv_writer = create_writer(&args.output_prefix, "tsv", |path| {
        TsvWriter::new(path, args.collapse_alleles)
    })?;

    let (sender_locus, receiver_locus) = bounded(CHANNEL_BUFFER_SIZE);
    let alleles_path = args.alleles_path.clone();
    let locus_stream_thread =
        thread::spawn(move || stream_variants_into_channel(&alleles_path, sender_locus));

    let (sender_result, receiver_result) = bounded(CHANNEL_BUFFER_SIZE);
    let writer_thread =
        thread::spawn(move || write_in_order(receiver_result, bed_writer, tsv_writer));

    log::debug!(
        "Initializing thread pool with {} threads...",
        args.num_threads
    );
    let pool = ThreadPoolBuilder::new()
        .num_threads(args.num_threads)
        .thread_name(|i| format!("strtyper-{}", i))
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))?;
    pool.install(|| {
        receiver_locus
            .into_iter()
            .par_bridge()
            .for_each_with(&sender_result, |s, locus_result| match locus_result {
                Ok((ordinal, variant)) => {
                    process_variant(ordinal, variant, &genotyper, &workflow_params, s)
                }
                Err(err) => log::error!("Locus processing: {:#}", err),
            });
    });

    // Clean-up
    drop(sender_result);
    let num_written = writer_thread
        .join()
        .map_err(|_| "Writer thread panicked".to_string())??;
    log::trace!("Writer thread finished");
    locus_stream_thread
        .join()
        .map_err(|_| "Locus stream thread panicked".to_string())??;
    log::trace!("Locus stream thread finished");

    log::info!("Reported {} loci", num_written);
    Ok(())
}

/// Minimum cluster size: discovery runs never require more reads per
/// cluster than they require to call an expansion.
fn cluster_config_from_args(args: &GenotypeArgs) -> ClusterConfig {
    let min_reads = if args.min_expansion.is_some() {
        std::cmp::min(args.min_cluster_size, args.min_support)
    } else {
        args.min_cluster_size
    };
    ClusterConfig::new(min_reads, args.max_num_clusters, args.eps)
}

fn process_variant(
    ordinal: usize,
    variant: Variant,
    genotyper: &Genotyper,
    params: &Params,
    sender_result: &Sender<(usize, Option<Variant>)>,
) {
    let result = analyze(variant, genotyper, params);
    if let Err(e) = sender_result.send((ordinal, result)) {
        log::error!("Failed to send locus result to writer thread: {}", e);
    }
}

/// Writes results in table order; every ordinal is expected exactly once.
fn write_in_order(
    receiver: Receiver<(usize, Option<Variant>)>,
    mut bed_writer: BedWriter,
    mut tsv_writer: TsvWriter,
) -> Result<usize> {
    let mut pending = BTreeMap::new();
    let mut next_ordinal = 0;
    let mut num_written = 0;

    let mut write = |variant: &Variant| -> Result<()> {
        bed_writer.write(variant)?;
        tsv_writer.write(variant)?;
        num_written += 1;
        Ok(())
    };

    for (ordinal, result) in receiver {
        pending.insert(ordinal, result);
        while let Some(result) = pending.remove(&next_ordinal) {
            if let Some(variant) = result {
                write(&variant)?;
            }
            next_ordinal += 1;
        }
    }
    if !pending.is_empty() {
        log::warn!("{} loci arrived out of sequence", pending.len());
        for variant in pending.into_values().flatten() {
            write(&variant)?;
        }
    }
    drop(write);

    bed_writer.flush()?;
    tsv_writer.flush()?;
    Ok(num_written)
}
