use clap::{ArgAction, Parser};
use noteml_logging::LogOutput;
use serde::Serialize;
use std::path::PathBuf;

/// Every option of a training run, as given on the command line.
///
/// Field names double as the option names used by [`crate::Config::get`].
#[derive(Parser, Serialize, Debug, Clone)]
#[command(name = "noteml-train", version, allow_negative_numbers = true)]
pub struct ConfigArgs {
    /// Data path
    #[clap(long, default_value = "data/mimic")]
    pub data_path: PathBuf,

    /// Save file
    #[clap(long, default_value = "saved/recent.dat")]
    pub save_file: PathBuf,

    /// Save file for best validation losses. Not written when unset.
    #[clap(long)]
    pub best_save_file: Option<PathBuf>,

    /// File to load model from
    #[clap(long)]
    pub load_file: Option<PathBuf>,

    /// File to load base BOW model from for baseline2grnn
    #[clap(long)]
    pub base_file: Option<PathBuf>,

    /// File to load embeddings from
    #[clap(long)]
    pub emb_file: Option<PathBuf>,

    /// The type of notes to consider
    #[clap(long, default_value = "Discharge_summary")]
    pub note_type: String,

    /// Format the data is stored in (jsonl or dummy)
    #[clap(long, default_value = "jsonl")]
    pub data_storage: String,

    /// The runner to run
    #[clap(long)]
    pub runner: Option<String>,

    /// File to dump plot info to
    #[clap(long)]
    pub plot_file: Option<PathBuf>,

    /// File to dump visualization info to
    #[clap(long)]
    pub vis_file: Option<PathBuf>,

    /// Name for plot info
    #[clap(long, default_value = "")]
    pub plot_name: String,

    /// Batch size
    #[clap(long, default_value_t = 32)]
    pub batch_size: usize,

    /// L1-regularization scale
    #[clap(long, default_value_t = 0.0)]
    pub l1_reg: f64,

    /// L2-regularization scale
    #[clap(long, default_value_t = 0.0)]
    pub l2_reg: f64,

    /// ce/l1
    #[clap(long, default_value = "ce")]
    pub grnn_loss: String,

    /// Compute precision and recall at these values of k
    #[clap(long, default_value = "8,24,40")]
    pub pr_at_k: String,

    /// Ensure similar note lengths in a batch
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub length_sort: bool,

    /// Word embedding size
    #[clap(long, default_value_t = 192)]
    pub word_emb_size: usize,

    /// Label embedding size (if applicable)
    #[clap(long, default_value_t = 128)]
    pub label_emb_size: usize,

    /// Convolutional layers
    #[clap(long, default_value_t = 20)]
    pub layers: usize,

    /// gru/lstm/entnet
    #[clap(long, default_value = "gru")]
    pub rnn_type: String,

    /// Train RNN with GRNN's number of parameters
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub rnn_grnn_size: bool,

    /// gru/attnbow/conv/embs
    #[clap(long, default_value = "gru")]
    pub encoder: String,

    /// grnn/lrgrnn/reggrnn/max/mean/hmax/hmean
    #[clap(long, default_value = "grnn")]
    pub readout: String,

    /// Train the base model for baseline2grnn
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub train_base: bool,

    /// 2-layer RNN. Needs to be true for bidirectional
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub multilayer: bool,

    /// Bidirectional RNN
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub bidirectional: bool,

    /// Concatenate the input to the first layer output for multilayer
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub reconcat_input: bool,

    /// Ensure positive diagonal in semidiagonal GRNN
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub positive_diag: bool,

    /// Biased re-sigmoid for GRNN output
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub biased_sigmoid: bool,

    /// Enable grounded to controller projection.
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub g_to_h_block: bool,

    /// Stop gradients from controller to grounded.
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub detach_g_to_h: bool,

    /// Sliced GRNN
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub sliced_grnn: bool,

    /// Number of sliced labels
    #[clap(long, default_value_t = 256)]
    pub sliced_labels: usize,

    /// Sample negative labels uniformly for sliced GRNN
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub sample_uniform: bool,

    /// GRNN dropout from concepts to control
    #[clap(long, default_value_t = 0.0)]
    pub dropout: f64,

    /// c, h, ch
    #[clap(long, default_value = "ch")]
    pub lstm_hidden: String,

    /// One dim per concept for normlstm
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub normlstm_mem: bool,

    /// Diagonal weights in GRNN cells
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub diagonal_cell: bool,

    /// Number of blocks for EntNet
    #[clap(long, default_value_t = 8)]
    pub num_blocks: usize,

    /// Hidden size for RNN
    #[clap(long, default_value_t = 128)]
    pub hidden_size: usize,

    /// Latent label space size for grounded RNN
    #[clap(long, default_value_t = 128)]
    pub latent_size: usize,

    /// sigmoid/cosine/softmax/scale/fixed
    #[clap(long, default_value = "sigmoid")]
    pub grnn_summary: String,

    /// Number of dims to look at for each label
    #[clap(long, default_value_t = 2)]
    pub grnn_fixedsize: usize,

    /// Train word embeddings
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub train_embs: bool,

    /// Use attention where optional
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub use_attention: bool,

    /// Language modeling objective weight
    #[clap(long, default_value_t = 0.0)]
    pub lm_weight: f64,

    /// The span of words to determine score for attention
    #[clap(long, default_value_t = 5)]
    pub attn_window: usize,

    /// Apply attention on each dimension individually
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub attn_on_dims: bool,

    /// Use sigmoid instead of softmax for attention
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub sigmoid_attn: bool,

    /// Increase max note length as training progresses
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub curriculum: bool,

    /// Randomly chop off notes during training
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub random_chop: bool,

    /// Starting note length for curriculum
    #[clap(long, default_value_t = 50)]
    pub len_start: usize,

    /// Fraction of note length to increase by on each epoch for curriculum
    #[clap(long, default_value_t = 0.35)]
    pub len_multiply: f64,

    /// Maximum note length. -1 to disable
    #[clap(long, default_value_t = 4000)]
    pub max_note_len: i64,

    /// Diagnoses vocabulary for labels. -1 for default
    #[clap(long, default_value_t = 500)]
    pub max_dgn_labels: i64,

    /// Procedures vocabulary for labels. -1 for default
    #[clap(long, default_value_t = 0)]
    pub max_pcd_labels: i64,

    /// If positive, compute stats on these many top labels (for debugging)
    #[clap(long, default_value_t = -1)]
    pub test_labels: i64,

    /// Optimizer to use (sgd, adam, adagrad, adadelta)
    #[clap(long, default_value = "adam")]
    pub optimizer: String,

    /// Maximum gradient norm for clipping
    #[clap(long, default_value_t = 5.0)]
    pub max_grad_norm: f64,

    /// Optimizer initial learning rate
    #[clap(long, default_value_t = 1e-3)]
    pub learning_rate: f64,

    /// Maximum number of threads/subprocesses. -1 to automatically determine
    #[clap(long, default_value_t = -1)]
    pub threads: i64,

    /// Number of training+val epochs. -1 for no limit, 0 to skip to testing.
    #[clap(long, default_value_t = -1)]
    pub epochs: i64,

    /// Max steps per epoch (for debugging)
    #[clap(long, default_value_t = -1)]
    pub max_steps: i64,

    /// Initial best score (for resuming from a best_save_file)
    #[clap(long, default_value_t = 0.0)]
    pub best_score: f64,

    /// Epoch to sanity check loss at. -1 to disable.
    #[clap(long, default_value_t = -1)]
    pub sanity_epoch: i64,

    /// Minimum loss at sanity epoch to not quit
    #[clap(long, default_value_t = 0.33)]
    pub sanity_min: f64,

    /// Maximum loss at sanity epoch to not quit
    #[clap(long, default_value_t = 1.0)]
    pub sanity_max: f64,

    /// Stop early if validation loss stops improving
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub early_stop: bool,

    /// Compute macro-averaged AUCs (slow)
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub macro_auc: bool,

    /// Minimum number of epochs before early stopping
    #[clap(long, default_value_t = 20)]
    pub min_epochs: i64,

    /// Increase early stop target by this when new best validation
    #[clap(long, default_value_t = 1.25)]
    pub stop_increment: f64,

    /// Fraction of data for vocab to cover
    #[clap(long, default_value_t = 0.97)]
    pub keep_vocab: f64,

    /// Fraction of patients for training. test = 1 - train - val
    #[clap(long, default_value_t = 0.9)]
    pub train_split: f64,

    /// Fraction of patients for validation. test = 1 - train - val
    #[clap(long, default_value_t = 0.033)]
    pub val_split: f64,

    /// Fraction of training data to use for training (for debugging)
    #[clap(long, default_value_t = 1.0)]
    pub train_fraction: f64,

    /// Print every these many steps (0 to disable)
    #[clap(long, default_value_t = 50)]
    pub print_every: u64,

    /// Save every these many steps (0 to disable)
    #[clap(long, default_value_t = 500)]
    pub save_every: u64,

    /// Overwrite the same save file each time
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub save_overwrite: bool,

    /// Run visualizations
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub visualize: bool,

    /// Query for visualization
    #[clap(long, default_value = "")]
    pub query: String,

    /// Allow stopwords in stat BOW model
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub bow_stopwords: bool,

    /// Sublinear term frequencies for stat BOW model
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub bow_log_tf: bool,

    /// Normalize BOW vectors, can be 'l1' or 'l2'
    #[clap(long)]
    pub bow_norm: Option<String>,

    /// Search for optimal BOW hyperparameters
    #[clap(
        long,
        action = ArgAction::Set,
        default_value_t = false,
        default_missing_value = "true",
        num_args = 0..=1
    )]
    pub bow_search: bool,

    /// File containing optimal BOW hyperparameters
    #[clap(long)]
    pub bow_hpfile: Option<PathBuf>,

    /// Where log lines go.
    #[clap(long, value_enum, default_value_t = LogOutput::Console)]
    pub log_output: LogOutput,

    /// Also append detailed logs to this file.
    #[clap(long)]
    pub write_log: Option<PathBuf>,
}
