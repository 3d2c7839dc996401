//! Text-to-image workflow builder.
//!
//! Produces the standard seven-node graph: checkpoint loader, CLIP
//! encodes for the prompt and the negative prompt, empty latent,
//! sampler, VAE decode, save image. The server consumes the graph as
//! plain JSON keyed by node id.

use rand::Rng;

/// Builder for a single text-to-image generation graph.
pub struct TextToImageWorkflow {
    prompt: String,
    checkpoint: String,
    negative_prompt: String,
    width: u32,
    height: u32,
    steps: u32,
    cfg: f64,
    seed: Option<u64>,
}

impl TextToImageWorkflow {
    /// Node id of the save-image node; generated files appear under
    /// this key in the job's artifact map.
    pub const OUTPUT_NODE: &'static str = "9";

    /// A workflow for `prompt` using the given checkpoint model.
    pub fn new(prompt: impl Into<String>, checkpoint: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            checkpoint: checkpoint.into(),
            negative_prompt: "bad hands".into(),
            width: 512,
            height: 512,
            steps: 20,
            cfg: 8.0,
            seed: None,
        }
    }

    /// Override the negative prompt.
    pub fn negative_prompt(mut self, negative: impl Into<String>) -> Self {
        self.negative_prompt = negative.into();
        self
    }

    /// Override the output resolution.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Override the sampler step count.
    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    /// Pin the sampler seed. Without this, every build draws a fresh
    /// random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Assemble the node graph.
    pub fn build(&self) -> serde_json::Value {
        let seed = self
            .seed
            .unwrap_or_else(|| rand::rng().random::<u32>() as u64);

        serde_json::json!({
            "3": {
                "class_type": "KSampler",
                "inputs": {
                    "cfg": self.cfg,
                    "denoise": 1,
                    "latent_image": ["5", 0],
                    "model": ["4", 0],
                    "negative": ["7", 0],
                    "positive": ["6", 0],
                    "sampler_name": "euler",
                    "scheduler": "normal",
                    "seed": seed,
                    "steps": self.steps,
                }
            },
            "4": {
                "class_type": "CheckpointLoaderSimple",
                "inputs": {
                    "ckpt_name": self.checkpoint,
                }
            },
            "5": {
                "class_type": "EmptyLatentImage",
                "inputs": {
                    "batch_size": 1,
                    "height": self.height,
                    "width": self.width,
                }
            },
            "6": {
                "class_type": "CLIPTextEncode",
                "inputs": {
                    "clip": ["4", 1],
                    "text": self.prompt,
                }
            },
            "7": {
                "class_type": "CLIPTextEncode",
                "inputs": {
                    "clip": ["4", 1],
                    "text": self.negative_prompt,
                }
            },
            "8": {
                "class_type": "VAEDecode",
                "inputs": {
                    "samples": ["3", 0],
                    "vae": ["4", 2],
                }
            },
            "9": {
                "class_type": "SaveImage",
                "inputs": {
                    "filename_prefix": "fireside",
                    "images": ["8", 0],
                }
            },
        })
    }
}
