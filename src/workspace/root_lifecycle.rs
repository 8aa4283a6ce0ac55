use super::*;

impl Workspace {
    pub fn init(root: &Path, force: bool) -> Result<Self> {
        Self::init_with_config(root, DeskConfig::default(), force)
    }

    pub fn init_with_config(root: &Path, config: DeskConfig, force: bool) -> Result<Self> {
        let dir = Self::desk_dir(root);
        if dir.exists() && !force {
            return Err(anyhow!(
                "{} already exists at {} (use --force to re-init)",
                DESK_DIR,
                dir.display()
            ));
        }
        config.validate().context("validate config")?;
        std::fs::create_dir_all(dir.join("cache")).context("create cache dir")?;
        write_config(&dir, &config)?;
        Self::open(root)
    }

    pub fn open(root: &Path) -> Result<Self> {
        let dir = Self::desk_dir(root);
        if !dir.is_dir() {
            return Err(anyhow!(
                "No {} directory found at {} (run `sploitdesk init`)",
                DESK_DIR,
                dir.display()
            ));
        }
        let config = read_config(&dir)?;
        let cache = DirCache::open(&dir.join("cache"))?;
        let store = FileStore::hydrate(Box::new(cache));
        let client = BackendClient::new(&config.backend, &config.ai)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
            store,
            client,
        })
    }

    pub fn discover(start: &Path) -> Result<Self> {
        let start = start
            .canonicalize()
            .with_context(|| format!("canonicalize {}", start.display()))?;
        for dir in start.ancestors() {
            if Self::desk_dir(dir).is_dir() {
                return Self::open(dir);
            }
        }
        Err(anyhow!(
            "No {} directory found (run `sploitdesk init`)",
            DESK_DIR
        ))
    }

    pub fn save_config(&self) -> Result<()> {
        self.config.validate().context("validate config")?;
        write_config(&Self::desk_dir(&self.root), &self.config)
    }
}

fn read_config(dir: &Path) -> Result<DeskConfig> {
    let bytes = std::fs::read(dir.join("config.json")).context("read config.json")?;
    let cfg: DeskConfig = serde_json::from_slice(&bytes).context("parse config.json")?;
    cfg.validate().context("validate config.json")?;
    Ok(cfg)
}

fn write_config(dir: &Path, cfg: &DeskConfig) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(cfg).context("serialize config")?;
    write_atomic(&dir.join("config.json"), &bytes).context("write config.json")?;
    Ok(())
}
